use std::fmt;
use std::str::FromStr;

use num_complex::Complex;

use crate::config::Thresholds;
use crate::errors::CircuitError;
use crate::math::{sinusoid_peak, sinusoid_rms, CScalar, Scalar};

use super::component::Component;

/// Connection topology tag.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyKind {
    /// Series connection (impedances add linearly).
    Series,
    /// Parallel connection (admittances add linearly).
    Parallel,
    /// Parallel connection of branches, each an internal series chain.
    Mixed,
}

impl TopologyKind {
    /// What an empty circuit of this kind is missing, for messages.
    #[must_use]
    pub const fn unit_noun(self) -> &'static str {
        match self {
            Self::Series | Self::Parallel => "component",
            Self::Mixed => "non-empty branch",
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Series => "series",
            Self::Parallel => "parallel",
            Self::Mixed => "mixed",
        })
    }
}

impl FromStr for TopologyKind {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "series" | "serie" => Ok(Self::Series),
            "parallel" | "paralelo" => Ok(Self::Parallel),
            "mixed" | "misto" => Ok(Self::Mixed),
            _ => Err(CircuitError::UnknownTopology(s.to_string())),
        }
    }
}

/// Ordered series chain of components inside a Mixed topology.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Branch {
    /// Components in series order.
    pub components: Vec<Component>,
}

impl Branch {
    /// Creates a branch from its components.
    #[must_use]
    pub fn new(components: impl IntoIterator<Item = Component>) -> Self {
        Self {
            components: components.into_iter().collect(),
        }
    }

    /// Series resistor-inductor group.
    #[must_use]
    pub fn rl(resistance: Scalar, inductance: Scalar) -> Self {
        Self::new([Component::resistor(resistance), Component::inductor(inductance)])
    }

    /// Series resistor-capacitor group.
    #[must_use]
    pub fn rc(resistance: Scalar, capacitance: Scalar) -> Self {
        Self::new([Component::resistor(resistance), Component::capacitor(capacitance)])
    }

    /// Series resistor-inductor-capacitor group.
    #[must_use]
    pub fn rlc(resistance: Scalar, inductance: Scalar, capacitance: Scalar) -> Self {
        Self::new([
            Component::resistor(resistance),
            Component::inductor(inductance),
            Component::capacitor(capacitance),
        ])
    }

    /// True when the branch holds no components. Empty branches are skipped by the solver.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Topology together with its elements.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "elements", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq)]
pub enum Topology {
    /// All components in one series chain.
    Series(Vec<Component>),
    /// All components across the same pair of nodes.
    Parallel(Vec<Component>),
    /// Branches in parallel, each a series chain.
    Mixed(Vec<Branch>),
}

impl Topology {
    /// Tag of the topology.
    #[must_use]
    pub const fn kind(&self) -> TopologyKind {
        match self {
            Self::Series(_) => TopologyKind::Series,
            Self::Parallel(_) => TopologyKind::Parallel,
            Self::Mixed(_) => TopologyKind::Mixed,
        }
    }

    /// True when there is nothing to compute: no components, or only empty branches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Series(components) | Self::Parallel(components) => components.is_empty(),
            Self::Mixed(branches) => branches.iter().all(Branch::is_empty),
        }
    }
}

/// How the source magnitude relates to the sinusoid it describes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WaveformReference {
    /// Magnitude is the RMS value.
    #[default]
    Rms,
    /// Magnitude is the peak value.
    Peak,
}

/// Sinusoidal voltage source driving the circuit.
///
/// The solver uses `magnitude` as the reference phasor at phase 0 regardless of
/// `waveform`; the reference only matters when rebuilding time-domain curves.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Source {
    /// Voltage magnitude (V).
    pub magnitude: Scalar,
    /// Interpretation of `magnitude`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub waveform: WaveformReference,
    /// Linear frequency (Hz).
    pub frequency: Scalar,
}

impl Source {
    /// Creates a source with an RMS magnitude.
    #[must_use]
    pub const fn rms(magnitude: Scalar, frequency_hz: Scalar) -> Self {
        Self {
            magnitude,
            waveform: WaveformReference::Rms,
            frequency: frequency_hz,
        }
    }

    /// Creates a source with a peak magnitude.
    #[must_use]
    pub const fn peak(magnitude: Scalar, frequency_hz: Scalar) -> Self {
        Self {
            magnitude,
            waveform: WaveformReference::Peak,
            frequency: frequency_hz,
        }
    }

    /// Reference phasor `(magnitude, 0)`.
    #[must_use]
    pub fn phasor(&self) -> CScalar {
        Complex::new(self.magnitude, 0.0)
    }

    /// Peak amplitude of the sinusoid, for time-domain reconstruction.
    #[must_use]
    pub fn peak_amplitude(&self) -> Scalar {
        match self.waveform {
            WaveformReference::Rms => sinusoid_peak(self.magnitude),
            WaveformReference::Peak => self.magnitude,
        }
    }

    /// RMS value of the sinusoid.
    #[must_use]
    pub fn rms_magnitude(&self) -> Scalar {
        match self.waveform {
            WaveformReference::Rms => self.magnitude,
            WaveformReference::Peak => sinusoid_rms(self.magnitude),
        }
    }
}

/// Complete circuit description: topology, elements and source.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Elements and how they are connected.
    pub topology: Topology,
    /// Driving source.
    pub source: Source,
}

impl Circuit {
    /// Creates a circuit.
    #[must_use]
    pub const fn new(topology: Topology, source: Source) -> Self {
        Self { topology, source }
    }

    /// Series circuit over `components`.
    #[must_use]
    pub fn series(components: impl IntoIterator<Item = Component>, source: Source) -> Self {
        Self::new(Topology::Series(components.into_iter().collect()), source)
    }

    /// Parallel circuit over `components`.
    #[must_use]
    pub fn parallel(components: impl IntoIterator<Item = Component>, source: Source) -> Self {
        Self::new(Topology::Parallel(components.into_iter().collect()), source)
    }

    /// Mixed circuit over `branches`.
    #[must_use]
    pub fn mixed(branches: impl IntoIterator<Item = Branch>, source: Source) -> Self {
        Self::new(Topology::Mixed(branches.into_iter().collect()), source)
    }

    /// Builds a circuit from a textual topology tag. Flat tags use `components`,
    /// `mixed` uses `branches`; the other list is ignored.
    pub fn from_tag(
        tag: &str,
        components: Vec<Component>,
        branches: Vec<Branch>,
        source: Source,
    ) -> Result<Self, CircuitError> {
        let topology = match tag.parse::<TopologyKind>()? {
            TopologyKind::Series => Topology::Series(components),
            TopologyKind::Parallel => Topology::Parallel(components),
            TopologyKind::Mixed => Topology::Mixed(branches),
        };
        Ok(Self::new(topology, source))
    }

    /// Tag of the topology.
    #[must_use]
    pub const fn kind(&self) -> TopologyKind {
        self.topology.kind()
    }

    /// Copy of this circuit driven at another frequency.
    #[must_use]
    pub fn at_frequency(&self, frequency_hz: Scalar) -> Self {
        Self {
            topology: self.topology.clone(),
            source: Source {
                frequency: frequency_hz,
                ..self.source
            },
        }
    }
}

/// Equivalent impedance of impedances connected in series.
#[must_use]
pub fn series_impedance<I>(impedances: I) -> CScalar
where
    I: IntoIterator<Item = CScalar>,
{
    impedances.into_iter().fold(CScalar::default(), |acc, z| acc + z)
}

/// Equivalent impedance of impedances connected in parallel.
///
/// Any short (`|Z|` below the near-zero cutoff) forces exactly zero. Infinite members
/// contribute no admittance, while large finite ones still do. When nothing
/// contributes, or the summed admittance is below `1 / open_circuit_impedance`,
/// the result is `+∞`.
#[must_use]
pub fn parallel_impedance<I>(impedances: I, thresholds: &Thresholds) -> CScalar
where
    I: IntoIterator<Item = CScalar>,
{
    let mut admittance = CScalar::default();
    let mut contributors = 0usize;
    for z in impedances {
        if thresholds.is_short(z) {
            return CScalar::default();
        }
        if z.is_infinite() {
            continue;
        }
        admittance += Complex::new(1.0, 0.0) / z;
        contributors += 1;
    }

    if contributors == 0 || admittance.norm() <= thresholds.open_admittance() {
        Complex::new(Scalar::INFINITY, 0.0)
    } else {
        Complex::new(1.0, 0.0) / admittance
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::circuits::component::ElementKind;

    #[test]
    fn series_adds_impedances() {
        let z = series_impedance([Complex::new(100.0, 0.0), Complex::new(50.0, 25.0)]);
        assert_relative_eq!(z.re, 150.0);
        assert_relative_eq!(z.im, 25.0);
    }

    #[test]
    fn parallel_combines_admittance() {
        let t = Thresholds::default();
        let z = parallel_impedance([Complex::new(100.0, 0.0), Complex::new(100.0, 0.0)], &t);
        assert_relative_eq!(z.re, 50.0);
        assert_relative_eq!(z.im, 0.0);
    }

    #[test]
    fn parallel_short_dominates() {
        let t = Thresholds::default();
        let z = parallel_impedance(
            [Complex::new(1.0e6, 3.0), Complex::new(1.0e-12, 0.0), Complex::new(5.0, -2.0)],
            &t,
        );
        assert_eq!(z, Complex::new(0.0, 0.0));
    }

    #[test]
    fn parallel_skips_open_members() {
        let t = Thresholds::default();
        let z = parallel_impedance(
            [Complex::new(0.0, Scalar::NEG_INFINITY), Complex::new(20.0, 0.0)],
            &t,
        );
        assert_relative_eq!(z.re, 20.0, max_relative = 1.0e-12);
    }

    #[test]
    fn large_finite_members_still_conduct_together() {
        let t = Thresholds::default();
        let z = parallel_impedance(std::iter::repeat(Complex::new(5.0e12, 0.0)).take(10), &t);
        assert_relative_eq!(z.re, 5.0e11, max_relative = 1.0e-12);
        assert_relative_eq!(z.im, 0.0);
        assert!(!t.is_open(z));
    }

    #[test]
    fn parallel_of_only_opens_is_open() {
        let t = Thresholds::default();
        let z = parallel_impedance([Complex::new(0.0, Scalar::NEG_INFINITY)], &t);
        assert!(t.is_open(z));
        let empty = parallel_impedance(std::iter::empty(), &t);
        assert!(t.is_open(empty));
    }

    #[test]
    fn parallel_resonance_cancelling_admittance_is_open() {
        let t = Thresholds::default();
        let z = parallel_impedance([Complex::new(0.0, 10.0), Complex::new(0.0, -10.0)], &t);
        assert!(t.is_open(z));
    }

    #[test]
    fn topology_tags_parse_case_insensitively() {
        assert_eq!("Series".parse::<TopologyKind>(), Ok(TopologyKind::Series));
        assert_eq!(" PARALLEL ".parse::<TopologyKind>(), Ok(TopologyKind::Parallel));
        assert_eq!("mixed".parse::<TopologyKind>(), Ok(TopologyKind::Mixed));
        assert_eq!(
            "delta".parse::<TopologyKind>(),
            Err(CircuitError::UnknownTopology("delta".into()))
        );
    }

    #[test]
    fn preset_groups_keep_series_order() {
        let kinds = |b: Branch| b.components.iter().map(Component::kind).collect::<Vec<_>>();
        assert_eq!(kinds(Branch::rl(1.0, 1.0e-3)), [ElementKind::Resistor, ElementKind::Inductor]);
        assert_eq!(kinds(Branch::rc(1.0, 1.0e-6)), [ElementKind::Resistor, ElementKind::Capacitor]);
        assert_eq!(
            kinds(Branch::rlc(1.0, 1.0e-3, 1.0e-6)),
            [ElementKind::Resistor, ElementKind::Inductor, ElementKind::Capacitor]
        );
    }

    #[test]
    fn mixed_with_only_empty_branches_is_empty() {
        let topology = Topology::Mixed(vec![Branch::default(), Branch::default()]);
        assert!(topology.is_empty());
        let topology = Topology::Mixed(vec![Branch::default(), Branch::new([Component::resistor(1.0)])]);
        assert!(!topology.is_empty());
    }

    #[test]
    fn source_waveform_conversions() {
        let rms = Source::rms(127.0, 60.0);
        assert_relative_eq!(rms.peak_amplitude(), 127.0 * 2f64.sqrt(), max_relative = 1.0e-12);
        let peak = Source::peak(10.0, 60.0);
        assert_relative_eq!(peak.rms_magnitude(), 10.0 / 2f64.sqrt(), max_relative = 1.0e-12);
        assert_eq!(peak.phasor(), Complex::new(10.0, 0.0));
    }

    #[test]
    fn at_frequency_keeps_topology() {
        let circuit = Circuit::series([Component::resistor(10.0)], Source::rms(1.0, 60.0));
        let moved = circuit.at_frequency(1.0e3);
        assert_eq!(moved.topology, circuit.topology);
        assert_eq!(moved.source.frequency, 1.0e3);
    }
}
