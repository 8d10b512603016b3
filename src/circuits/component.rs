use std::fmt;

use crate::math::Scalar;

/// Component type tag.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Ideal resistor.
    Resistor,
    /// Ideal inductor.
    Inductor,
    /// Ideal capacitor.
    Capacitor,
    /// Impedance given directly as a complex value.
    KnownImpedance,
}

impl ElementKind {
    /// Single-letter schematic designator prefix (`R`, `L`, `C`, `Z`).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Resistor => 'R',
            Self::Inductor => 'L',
            Self::Capacitor => 'C',
            Self::KnownImpedance => 'Z',
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resistor => "resistor",
            Self::Inductor => "inductor",
            Self::Capacitor => "capacitor",
            Self::KnownImpedance => "known impedance",
        })
    }
}

/// Declared impedance with a rectangular text form and/or a polar pair.
///
/// The text form is tried first; the polar pair is used when the text is absent
/// or does not parse.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnownImpedance {
    /// Rectangular text such as `3+4j`.
    pub rectangular: Option<String>,
    /// Polar magnitude in ohms.
    pub magnitude: Option<Scalar>,
    /// Polar angle in degrees.
    pub angle_deg: Option<Scalar>,
}

impl KnownImpedance {
    /// Declares an impedance by its rectangular text.
    #[must_use]
    pub fn rectangular(text: impl Into<String>) -> Self {
        Self {
            rectangular: Some(text.into()),
            ..Self::default()
        }
    }

    /// Declares an impedance by magnitude (Ω) and angle (degrees).
    #[must_use]
    pub const fn polar(magnitude: Scalar, angle_deg: Scalar) -> Self {
        Self {
            rectangular: None,
            magnitude: Some(magnitude),
            angle_deg: Some(angle_deg),
        }
    }
}

/// One passive element or declared impedance.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Resistor with resistance in ohms.
    Resistor {
        /// Resistance (Ω).
        resistance: Scalar,
    },
    /// Inductor with inductance in henries.
    Inductor {
        /// Inductance (H).
        inductance: Scalar,
    },
    /// Capacitor with capacitance in farads.
    Capacitor {
        /// Capacitance (F).
        capacitance: Scalar,
    },
    /// Impedance declared directly.
    KnownImpedance(KnownImpedance),
}

impl Component {
    /// Creates a resistor.
    #[must_use]
    pub const fn resistor(resistance_ohms: Scalar) -> Self {
        Self::Resistor {
            resistance: resistance_ohms,
        }
    }

    /// Creates an inductor.
    #[must_use]
    pub const fn inductor(inductance_h: Scalar) -> Self {
        Self::Inductor {
            inductance: inductance_h,
        }
    }

    /// Creates a capacitor.
    #[must_use]
    pub const fn capacitor(capacitance_f: Scalar) -> Self {
        Self::Capacitor {
            capacitance: capacitance_f,
        }
    }

    /// Creates a known impedance from rectangular text.
    #[must_use]
    pub fn impedance_text(text: impl Into<String>) -> Self {
        Self::KnownImpedance(KnownImpedance::rectangular(text))
    }

    /// Creates a known impedance from magnitude (Ω) and angle (degrees).
    #[must_use]
    pub const fn impedance_polar(magnitude: Scalar, angle_deg: Scalar) -> Self {
        Self::KnownImpedance(KnownImpedance::polar(magnitude, angle_deg))
    }

    /// Type tag of the component.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Resistor { .. } => ElementKind::Resistor,
            Self::Inductor { .. } => ElementKind::Inductor,
            Self::Capacitor { .. } => ElementKind::Capacitor,
            Self::KnownImpedance(_) => ElementKind::KnownImpedance,
        }
    }

    /// Schematic designator for the element at zero-based `index`, e.g. `L2`.
    #[must_use]
    pub fn designator(&self, index: usize) -> String {
        format!("{}{}", self.kind().letter(), index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn designators_use_kind_letter_and_one_based_index() {
        assert_eq!(Component::resistor(10.0).designator(0), "R1");
        assert_eq!(Component::capacitor(1.0e-6).designator(2), "C3");
        assert_eq!(Component::impedance_text("3+4j").designator(1), "Z2");
    }

    #[test]
    fn polar_constructor_leaves_text_empty() {
        let Component::KnownImpedance(z) = Component::impedance_polar(5.0, 53.13) else {
            panic!("expected known impedance");
        };
        assert!(z.rectangular.is_none());
        assert_eq!(z.magnitude, Some(5.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn components_serialize_with_kind_tag() {
        let json = serde_json::to_string(&Component::inductor(0.01)).expect("serialize");
        assert_eq!(json, r#"{"kind":"inductor","inductance":0.01}"#);
        let back: Component =
            serde_json::from_str(r#"{"kind":"known_impedance","rectangular":"3+4j"}"#)
                .expect("deserialize");
        assert_eq!(back, Component::impedance_text("3+4j"));
    }
}
