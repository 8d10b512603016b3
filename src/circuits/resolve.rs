//! Element impedance resolution.
//!
//! [`resolve`] turns one [`Component`] into its complex impedance at a linear
//! frequency plus a display label. It is pure: the same component and frequency
//! always give the same result, which is what makes [`ImpedanceCache`] safe.

use std::collections::HashMap;

use num_complex::Complex;

use crate::config::Thresholds;
use crate::constants::angular_frequency;
use crate::errors::ResolveError;
use crate::math::{format_rectangular, parse_complex, phasor_deg, CScalar, Scalar};
use crate::units::{format_scaled, Unit};

use super::component::{Component, ElementKind, KnownImpedance};

/// Impedance of one component at one frequency, with its display label.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImpedance {
    /// Complex impedance in ohms.
    pub impedance: CScalar,
    /// Display label, e.g. `L=26.5300 mH (X=10.0016 Ω)`. Cosmetic only.
    pub label: String,
}

/// Resolves `component` at `frequency_hz` with the default thresholds.
pub fn resolve(component: &Component, frequency_hz: Scalar) -> Result<ResolvedImpedance, ResolveError> {
    resolve_with(component, frequency_hz, &Thresholds::default())
}

/// Resolves `component` at `frequency_hz` using `thresholds.min_reactive_value`
/// as the smallest acceptable inductance or capacitance.
pub fn resolve_with(
    component: &Component,
    frequency_hz: Scalar,
    thresholds: &Thresholds,
) -> Result<ResolvedImpedance, ResolveError> {
    if !(frequency_hz.is_finite() && frequency_hz > 0.0) {
        return Err(ResolveError::InvalidFrequency(frequency_hz));
    }
    let omega = angular_frequency(frequency_hz);

    match component {
        Component::Resistor { resistance } => {
            let r = *resistance;
            if !(r.is_finite() && r >= 0.0) {
                return Err(invalid(
                    ElementKind::Resistor,
                    format!("resistance must be a finite value of at least 0 Ω, got {r}"),
                ));
            }
            Ok(ResolvedImpedance {
                impedance: Complex::new(r, 0.0),
                label: format!("R={r:.4} {}", Unit::Ohm),
            })
        }
        Component::Inductor { inductance } => {
            let l = *inductance;
            if !(l.is_finite() && l > thresholds.min_reactive_value) {
                return Err(invalid(
                    ElementKind::Inductor,
                    format!(
                        "inductance must be greater than {:e} H, got {l}",
                        thresholds.min_reactive_value
                    ),
                ));
            }
            let reactance = omega * l;
            Ok(ResolvedImpedance {
                impedance: Complex::new(0.0, reactance),
                label: format!("L={} (X={reactance:.4} {})", format_scaled(l, Unit::Henry), Unit::Ohm),
            })
        }
        Component::Capacitor { capacitance } => {
            let c = *capacitance;
            if !(c.is_finite() && c > thresholds.min_reactive_value) {
                return Err(invalid(
                    ElementKind::Capacitor,
                    format!(
                        "capacitance must be greater than {:e} F, got {c}",
                        thresholds.min_reactive_value
                    ),
                ));
            }
            let product = omega * c;
            let reactance = if product == 0.0 {
                Scalar::INFINITY
            } else {
                1.0 / product
            };
            Ok(ResolvedImpedance {
                impedance: Complex::new(0.0, -reactance),
                label: format!("C={} (X=-{reactance:.4} {})", format_scaled(c, Unit::Farad), Unit::Ohm),
            })
        }
        Component::KnownImpedance(known) => resolve_known(known),
    }
}

fn resolve_known(known: &KnownImpedance) -> Result<ResolvedImpedance, ResolveError> {
    let text = known
        .rectangular
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(z) = text.and_then(parse_complex) {
        return Ok(known_label(z));
    }

    match (known.magnitude, known.angle_deg) {
        (Some(magnitude), Some(angle)) if magnitude >= 0.0 && angle.is_finite() => {
            Ok(known_label(phasor_deg(magnitude, angle)))
        }
        (magnitude, angle) => {
            let text_part = match text {
                Some(t) => format!("rectangular text '{t}' is not a valid complex number"),
                None => String::from("no rectangular text given"),
            };
            let polar_part = match (magnitude, angle) {
                (None, None) => String::from("no polar magnitude and angle given"),
                (None, Some(_)) => String::from("polar magnitude missing"),
                (Some(_), None) => String::from("polar angle missing"),
                (Some(m), Some(a)) => format!(
                    "polar pair {m}∠{a}° invalid (magnitude must be at least 0, angle finite)"
                ),
            };
            Err(invalid(
                ElementKind::KnownImpedance,
                format!("{text_part}; {polar_part}"),
            ))
        }
    }
}

fn known_label(z: CScalar) -> ResolvedImpedance {
    let value = if z.is_infinite() {
        String::from("\u{221e}")
    } else {
        format_rectangular(z)
    };
    ResolvedImpedance {
        impedance: z,
        label: format!("Z={value} {}", Unit::Ohm),
    }
}

fn invalid(kind: ElementKind, reason: String) -> ResolveError {
    ResolveError::InvalidElementValue { kind, reason }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResolveKey {
    kind: ElementKind,
    params: [u64; 2],
    text: Option<String>,
    frequency: u64,
}

impl ResolveKey {
    fn new(component: &Component, frequency_hz: Scalar) -> Self {
        let bits = |v: Option<Scalar>| v.map_or(u64::MAX, Scalar::to_bits);
        let (params, text) = match component {
            Component::Resistor { resistance } => ([resistance.to_bits(), 0], None),
            Component::Inductor { inductance } => ([inductance.to_bits(), 0], None),
            Component::Capacitor { capacitance } => ([capacitance.to_bits(), 0], None),
            Component::KnownImpedance(known) => (
                [bits(known.magnitude), bits(known.angle_deg)],
                known.rectangular.clone(),
            ),
        };
        Self {
            kind: component.kind(),
            params,
            text,
            frequency: frequency_hz.to_bits(),
        }
    }
}

/// Memo table for [`resolve_with`], keyed by (kind, parameter bits, frequency bits).
///
/// Failures are memoized as well. Bound to one set of thresholds for its lifetime.
#[derive(Debug, Clone, Default)]
pub struct ImpedanceCache {
    thresholds: Thresholds,
    entries: HashMap<ResolveKey, Result<ResolvedImpedance, ResolveError>>,
    hits: usize,
}

impl ImpedanceCache {
    /// Creates an empty cache bound to `thresholds`.
    #[must_use]
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            entries: HashMap::new(),
            hits: 0,
        }
    }

    /// Resolves through the cache.
    pub fn resolve(
        &mut self,
        component: &Component,
        frequency_hz: Scalar,
    ) -> Result<ResolvedImpedance, ResolveError> {
        let key = ResolveKey::new(component, frequency_hz);
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return hit.clone();
        }
        let resolved = resolve_with(component, frequency_hz, &self.thresholds);
        self.entries.insert(key, resolved.clone());
        resolved
    }

    /// Number of memoized entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups answered from the table.
    #[must_use]
    pub const fn hits(&self) -> usize {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn resistor_impedance_is_real() {
        let z = resolve(&Component::resistor(100.0), 50.0).expect("valid").impedance;
        assert_eq!(z, Complex::new(100.0, 0.0));
    }

    #[test]
    fn zero_resistance_is_a_valid_short() {
        let z = resolve(&Component::resistor(0.0), 50.0).expect("valid").impedance;
        assert_eq!(z.norm(), 0.0);
    }

    #[test]
    fn inductor_reactance_and_label() {
        let resolved = resolve(&Component::inductor(26.53e-3), 60.0).expect("valid");
        assert_relative_eq!(resolved.impedance.re, 0.0);
        assert_relative_eq!(resolved.impedance.im, 2.0 * PI * 60.0 * 26.53e-3, max_relative = 1.0e-12);
        assert_eq!(resolved.label, "L=26.5300 mH (X=10.0016 Ω)");
    }

    #[test]
    fn capacitor_impedance_is_reactive() {
        let z = resolve(&Component::capacitor(1.0e-6), 1.0e3).expect("valid").impedance;
        assert_relative_eq!(z.re, 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(z.im, -1.0 / (2.0 * PI * 1.0e3 * 1.0e-6), max_relative = 1.0e-12);
    }

    #[test]
    fn underflowing_capacitor_product_is_open() {
        let thresholds = Thresholds {
            min_reactive_value: 1.0e-300,
            ..Thresholds::default()
        };
        let z = resolve_with(&Component::capacitor(1.0e-200), 1.0e-200, &thresholds)
            .expect("valid")
            .impedance;
        assert_eq!(z.im, Scalar::NEG_INFINITY);
    }

    #[test]
    fn rejects_non_positive_frequency() {
        for f in [0.0, -60.0, Scalar::NAN, Scalar::INFINITY] {
            let err = resolve(&Component::resistor(1.0), f).unwrap_err();
            assert!(matches!(err, ResolveError::InvalidFrequency(_)));
        }
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let cases = [
            Component::resistor(-1.0),
            Component::resistor(Scalar::NAN),
            Component::inductor(0.0),
            Component::inductor(1.0e-18),
            Component::capacitor(0.0),
            Component::capacitor(-1.0e-6),
        ];
        for component in cases {
            let err = resolve(&component, 60.0).unwrap_err();
            assert!(
                matches!(err, ResolveError::InvalidElementValue { kind, .. } if kind == component.kind()),
                "{component:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn rectangular_text_wins_over_polar() {
        let known = KnownImpedance {
            rectangular: Some("3+4j".into()),
            magnitude: Some(100.0),
            angle_deg: Some(-30.0),
        };
        let resolved = resolve(&Component::KnownImpedance(known), 60.0).expect("valid");
        assert_eq!(resolved.impedance, Complex::new(3.0, 4.0));
        assert_eq!(resolved.label, "Z=3.0000+4.0000j Ω");
    }

    #[test]
    fn polar_is_fallback_for_bad_text() {
        let known = KnownImpedance {
            rectangular: Some("three".into()),
            magnitude: Some(5.0),
            angle_deg: Some(90.0),
        };
        let z = resolve(&Component::KnownImpedance(known), 60.0).expect("valid").impedance;
        assert_relative_eq!(z.re, 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(z.im, 5.0, epsilon = 1.0e-12);
    }

    #[test]
    fn infinite_polar_magnitude_is_an_ideal_open() {
        let resolved = resolve(&Component::impedance_polar(Scalar::INFINITY, 0.0), 60.0).expect("valid");
        assert_eq!(resolved.impedance, Complex::new(Scalar::INFINITY, 0.0));
        assert_eq!(resolved.label, "Z=\u{221e} \u{3a9}");
        let text = resolve(&Component::impedance_text("\u{221e}"), 60.0).expect("valid");
        assert_eq!(text, resolved);
    }

    #[test]
    fn negative_infinite_magnitude_is_rejected() {
        let err = resolve(&Component::impedance_polar(Scalar::NEG_INFINITY, 0.0), 60.0).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidElementValue { kind: ElementKind::KnownImpedance, .. }));
    }

    #[test]
    fn insufficient_known_impedance_names_missing_inputs() {
        let known = KnownImpedance {
            rectangular: Some("bogus".into()),
            magnitude: Some(5.0),
            angle_deg: None,
        };
        let err = resolve(&Component::KnownImpedance(known), 60.0).unwrap_err();
        let ResolveError::InvalidElementValue { reason, .. } = err else {
            panic!("expected element error");
        };
        assert!(reason.contains("'bogus'"));
        assert!(reason.contains("polar angle missing"));
    }

    #[test]
    fn cache_returns_same_result_and_counts_hits() {
        let mut cache = ImpedanceCache::new(Thresholds::default());
        let component = Component::capacitor(10.0e-6);
        let first = cache.resolve(&component, 60.0).expect("valid");
        let second = cache.resolve(&component, 60.0).expect("valid");
        let other_freq = cache.resolve(&component, 50.0).expect("valid");
        assert_eq!(first, second);
        assert_ne!(first.impedance, other_freq.impedance);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.hits(), 1);
        assert_eq!(first, resolve(&component, 60.0).expect("valid"));
    }
}
