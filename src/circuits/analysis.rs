//! Topology reduction and network solving at a single frequency.
//!
//! [`NetworkSolver::solve`] walks the steps below for every topology:
//!
//! 1. reject empty circuits and invalid sources,
//! 2. resolve every element (the first failure aborts the solve),
//! 3. reduce to a total impedance (series sum, parallel admittance sum, or
//!    series-per-branch then parallel for Mixed),
//! 4. derive the total current, treating shorts and opens explicitly,
//! 5. derive complex power, power factor and the lead/lag character,
//! 6. fill in per-element and per-branch voltage/current detail.
//!
//! All near-zero and near-infinite decisions read the same [`Thresholds`].

use std::fmt;

use num_complex::Complex;

use crate::config::{SolverConfig, Thresholds};
use crate::errors::{CircuitError, ElementLocation};
use crate::math::{format_polar, phase_deg, CScalar, Scalar};
use crate::units::Unit;

use super::component::{Component, ElementKind};
use super::network::{parallel_impedance, series_impedance, Circuit, Source, Topology, TopologyKind};
use super::resolve::{resolve_with, ImpedanceCache, ResolvedImpedance};

/// Overall condition of the network seen by the source.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Finite, non-zero total impedance.
    Normal,
    /// Total impedance below the near-zero cutoff.
    ShortCircuit,
    /// Total impedance infinite or above the open cutoff.
    OpenCircuit,
    /// Total impedance is NaN.
    Indeterminate,
}

/// Condition of one element or branch in the detail records.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailFlag {
    /// Voltage and current are ordinary finite phasors.
    Normal,
    /// Impedance below the near-zero cutoff; current may be reported as infinite.
    Short,
    /// Impedance infinite or above the open cutoff; no current flows.
    Open,
    /// Voltage or current cannot be determined (reported as NaN).
    Indeterminate,
}

/// Lead/lag classification derived from the phase of the total impedance.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCharacter {
    /// Phase below the small-angle cutoff.
    Unity,
    /// Positive phase: inductive, current lags voltage.
    Lagging,
    /// Negative phase: capacitive, current leads voltage.
    Leading,
}

impl LoadCharacter {
    /// Classifies `z` by its phase. A phase that is not finite counts as unity.
    #[must_use]
    pub fn from_impedance(z: CScalar, thresholds: &Thresholds) -> Self {
        let phase = phase_deg(z);
        if !phase.is_finite() || phase.abs() < thresholds.unity_phase_deg {
            Self::Unity
        } else if phase > 0.0 {
            Self::Lagging
        } else {
            Self::Leading
        }
    }
}

impl fmt::Display for LoadCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unity => "unity",
            Self::Lagging => "lagging",
            Self::Leading => "leading",
        })
    }
}

/// Power factor P/|S|, with the two degenerate cases named.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerFactor {
    /// Ordinary ratio, within [-1, 1].
    Value(Scalar),
    /// Apparent power below the near-zero cutoff; defined as 1.0.
    UnityZeroPower,
    /// Total current not finite.
    Indeterminate,
}

impl PowerFactor {
    /// Numeric value, `None` when indeterminate.
    #[must_use]
    pub const fn value(self) -> Option<Scalar> {
        match self {
            Self::Value(v) => Some(v),
            Self::UnityZeroPower => Some(1.0),
            Self::Indeterminate => None,
        }
    }
}

impl fmt::Display for PowerFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.4}"),
            Self::UnityZeroPower => f.write_str("1.0000 (S≈0)"),
            Self::Indeterminate => f.write_str("Indeterminate"),
        }
    }
}

/// Complex power and the scalars derived from it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSummary {
    /// S = V·conj(I) (VA).
    pub complex: CScalar,
    /// P = Re(S) (W).
    pub active: Scalar,
    /// Q = Im(S) (VAR).
    pub reactive: Scalar,
    /// |S| (VA).
    pub apparent: Scalar,
    /// P/|S| or one of its degenerate cases.
    pub power_factor: PowerFactor,
    /// Lead/lag character from the phase of the total impedance.
    pub character: LoadCharacter,
}

impl PowerSummary {
    /// Derives power quantities from the source voltage, total current and total impedance.
    #[must_use]
    pub fn from_phasors(voltage: CScalar, current: CScalar, impedance: CScalar, thresholds: &Thresholds) -> Self {
        let character = LoadCharacter::from_impedance(impedance, thresholds);
        if !current.is_finite() {
            return Self {
                character,
                ..Self::indeterminate()
            };
        }

        let s = voltage * current.conj();
        let apparent = s.norm();
        let power_factor = if apparent < thresholds.near_zero_power {
            PowerFactor::UnityZeroPower
        } else {
            PowerFactor::Value((s.re / apparent).clamp(-1.0, 1.0))
        };
        Self {
            complex: s,
            active: s.re,
            reactive: s.im,
            apparent,
            power_factor,
            character,
        }
    }

    /// All quantities NaN, power factor indeterminate.
    #[must_use]
    pub fn indeterminate() -> Self {
        Self {
            complex: Complex::new(Scalar::NAN, Scalar::NAN),
            active: Scalar::NAN,
            reactive: Scalar::NAN,
            apparent: Scalar::NAN,
            power_factor: PowerFactor::Indeterminate,
            character: LoadCharacter::Unity,
        }
    }

    /// True when the power factor could not be computed.
    #[must_use]
    pub const fn is_indeterminate(&self) -> bool {
        matches!(self.power_factor, PowerFactor::Indeterminate)
    }
}

/// Voltage/current record for one element.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDetail {
    /// Position in the circuit.
    pub location: ElementLocation,
    /// Schematic designator, e.g. `R1` or `B2.C1`.
    pub designator: String,
    /// Component type.
    pub kind: ElementKind,
    /// Resolver label.
    pub label: String,
    /// Element impedance (Ω).
    pub impedance: CScalar,
    /// Voltage across the element (V).
    pub voltage: CScalar,
    /// Current through the element (A).
    pub current: CScalar,
    /// Condition of the element.
    pub flag: DetailFlag,
}

/// Voltage/current record for one Mixed branch.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BranchDetail {
    /// Zero-based branch index in the circuit (empty branches keep their slot).
    pub index: usize,
    /// Series-equivalent impedance of the branch (Ω).
    pub impedance: CScalar,
    /// Voltage across the branch, the source voltage (V).
    pub voltage: CScalar,
    /// Branch current (A).
    pub current: CScalar,
    /// Condition of the branch.
    pub flag: DetailFlag,
    /// Drill-down into the branch's components.
    pub elements: Vec<ElementDetail>,
}

/// Labeled phasor for phasor-diagram consumers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PhasorEntry {
    /// Label such as `V_source`, `I_total`, `V_R1`.
    pub label: String,
    /// Phasor value.
    pub phasor: CScalar,
}

/// Outcome of one solve. Built fresh per call and never mutated afterwards.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// False when the solve was aborted; every numeric field is then NaN.
    pub calc_ok: bool,
    /// Topology that was solved.
    pub topology: TopologyKind,
    /// Source frequency (Hz).
    pub frequency_hz: Scalar,
    /// Source phasor (V).
    pub source_voltage: CScalar,
    /// Equivalent impedance seen by the source (Ω). `+∞` for an open circuit.
    pub total_impedance: CScalar,
    /// Total current drawn from the source (A).
    pub total_current: CScalar,
    /// Short/open classification of the network.
    pub state: CircuitState,
    /// Power quantities.
    pub power: PowerSummary,
    /// Per-element detail (Series and Parallel).
    pub elements: Vec<ElementDetail>,
    /// Per-branch detail (Mixed).
    pub branches: Vec<BranchDetail>,
    /// Fatal errors when `calc_ok` is false, otherwise non-fatal findings.
    pub errors: Vec<CircuitError>,
}

impl SolveResult {
    fn failed(topology: TopologyKind, source: &Source, err: CircuitError) -> Self {
        let nan = Complex::new(Scalar::NAN, Scalar::NAN);
        Self {
            calc_ok: false,
            topology,
            frequency_hz: source.frequency,
            source_voltage: source.phasor(),
            total_impedance: nan,
            total_current: nan,
            state: CircuitState::Indeterminate,
            power: PowerSummary::indeterminate(),
            elements: Vec::new(),
            branches: Vec::new(),
            errors: vec![err],
        }
    }

    /// Error messages, one per recorded error.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Every element detail, flattening Mixed branches in order.
    pub fn all_elements(&self) -> impl Iterator<Item = &ElementDetail> {
        self.elements
            .iter()
            .chain(self.branches.iter().flat_map(|b| b.elements.iter()))
    }

    /// Labeled phasors: source voltage, total current, then voltage and current of every element.
    #[must_use]
    pub fn phasors(&self) -> Vec<PhasorEntry> {
        if !self.calc_ok {
            return Vec::new();
        }
        let mut out = vec![
            PhasorEntry {
                label: String::from("V_source"),
                phasor: self.source_voltage,
            },
            PhasorEntry {
                label: String::from("I_total"),
                phasor: self.total_current,
            },
        ];
        for element in self.all_elements() {
            out.push(PhasorEntry {
                label: format!("V_{}", element.designator),
                phasor: element.voltage,
            });
            out.push(PhasorEntry {
                label: format!("I_{}", element.designator),
                phasor: element.current,
            });
        }
        out
    }
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.calc_ok {
            writeln!(
                f,
                "{} circuit at {} {}: calculation failed",
                self.topology,
                self.frequency_hz,
                Unit::Hertz
            )?;
            for message in self.messages() {
                writeln!(f, "  error: {message}")?;
            }
            return Ok(());
        }
        let annotation = match self.state {
            CircuitState::Normal => "",
            CircuitState::ShortCircuit => " (short circuit)",
            CircuitState::OpenCircuit => " (open circuit)",
            CircuitState::Indeterminate => " (indeterminate)",
        };
        writeln!(f, "{} circuit at {} {}", self.topology, self.frequency_hz, Unit::Hertz)?;
        writeln!(f, "  V_source: {} {}", format_polar(self.source_voltage), Unit::Volt)?;
        writeln!(f, "  Z_total: {} {}{annotation}", format_polar(self.total_impedance), Unit::Ohm)?;
        writeln!(f, "  I_total: {} {}", format_polar(self.total_current), Unit::Ampere)?;
        writeln!(f, "  P: {:.4} W", self.power.active)?;
        writeln!(f, "  Q: {:.4} VAR", self.power.reactive)?;
        writeln!(f, "  S: {:.4} VA", self.power.apparent)?;
        writeln!(f, "  PF: {} ({})", self.power.power_factor, self.power.character)?;
        for element in &self.elements {
            writeln!(
                f,
                "  {} [{}]: V={} {}, I={} {}",
                element.designator,
                element.label,
                format_polar(element.voltage),
                Unit::Volt,
                format_polar(element.current),
                Unit::Ampere
            )?;
        }
        for branch in &self.branches {
            writeln!(
                f,
                "  branch {}: Z={} {}, I={} {}",
                branch.index + 1,
                format_polar(branch.impedance),
                Unit::Ohm,
                format_polar(branch.current),
                Unit::Ampere
            )?;
        }
        for message in self.messages() {
            writeln!(f, "  note: {message}")?;
        }
        Ok(())
    }
}

/// Current regime through a series chain.
#[derive(Debug, Clone, Copy)]
enum Flow {
    Finite(CScalar),
    Unbounded,
    Blocked,
    Undefined,
}

#[derive(Debug, Clone)]
struct ResolvedElement {
    location: ElementLocation,
    designator: String,
    kind: ElementKind,
    resolved: ResolvedImpedance,
}

impl ResolvedElement {
    fn impedance(&self) -> CScalar {
        self.resolved.impedance
    }

    fn detail(&self, voltage: CScalar, current: CScalar, flag: DetailFlag) -> ElementDetail {
        ElementDetail {
            location: self.location,
            designator: self.designator.clone(),
            kind: self.kind,
            label: self.resolved.label.clone(),
            impedance: self.resolved.impedance,
            voltage,
            current,
            flag,
        }
    }
}

/// Single-frequency network solver.
#[derive(Debug, Clone, Default)]
pub struct NetworkSolver {
    config: SolverConfig,
    cache: Option<ImpedanceCache>,
}

impl NetworkSolver {
    /// Creates a solver. A memo table is allocated when `config.memoize` is set.
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        let cache = config
            .memoize
            .then(|| ImpedanceCache::new(config.thresholds));
        Self { config, cache }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Memo table, when memoization is enabled.
    #[must_use]
    pub const fn cache(&self) -> Option<&ImpedanceCache> {
        self.cache.as_ref()
    }

    /// Solves `circuit`. Failures are reported inside the result, never as panics.
    pub fn solve(&mut self, circuit: &Circuit) -> SolveResult {
        let kind = circuit.kind();
        let _span = tracing::info_span!(
            "ac_solve",
            name = %self.config.name,
            topology = %kind,
            frequency_hz = circuit.source.frequency
        )
        .entered();

        match self.try_solve(circuit) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(error = %err, "solve aborted");
                SolveResult::failed(kind, &circuit.source, err)
            }
        }
    }

    fn try_solve(&mut self, circuit: &Circuit) -> Result<SolveResult, CircuitError> {
        let kind = circuit.kind();
        let source = circuit.source;
        if circuit.topology.is_empty() {
            return Err(CircuitError::EmptyTopology(kind));
        }
        if !(source.frequency.is_finite() && source.frequency > 0.0) {
            return Err(CircuitError::InvalidFrequency(source.frequency));
        }
        if !(source.magnitude.is_finite() && source.magnitude >= 0.0) {
            return Err(CircuitError::InvalidSource(source.magnitude));
        }

        let thresholds = self.config.thresholds;
        let v = source.phasor();

        let (total_impedance, elements, branches) = match &circuit.topology {
            Topology::Series(components) => {
                let resolved = self.resolve_flat(components, source.frequency)?;
                let z = series_impedance(resolved.iter().map(ResolvedElement::impedance));
                let (current, state) = total_current(z, v, &thresholds);
                let details = chain_details(&resolved, flow_of(state, current), v, &thresholds);
                (z, details, Vec::new())
            }
            Topology::Parallel(components) => {
                let resolved = self.resolve_flat(components, source.frequency)?;
                let z = parallel_impedance(resolved.iter().map(ResolvedElement::impedance), &thresholds);
                let details = resolved
                    .iter()
                    .map(|element| {
                        let (current, flag) = shunt_current(element.impedance(), v, &thresholds);
                        element.detail(v, current, flag)
                    })
                    .collect();
                (z, details, Vec::new())
            }
            Topology::Mixed(branches) => {
                let mut reduced = Vec::with_capacity(branches.len());
                for (b, branch) in branches.iter().enumerate() {
                    if branch.is_empty() {
                        tracing::debug!(branch = b + 1, "skipping empty branch");
                        continue;
                    }
                    let resolved = self.resolve_chain(
                        branch.components.iter().enumerate().map(|(i, component)| {
                            (
                                ElementLocation::in_branch(b, i),
                                format!("B{}.{}", b + 1, component.designator(i)),
                                component,
                            )
                        }),
                        source.frequency,
                    )?;
                    let zb = series_impedance(resolved.iter().map(ResolvedElement::impedance));
                    reduced.push((b, resolved, zb));
                }

                let z = parallel_impedance(reduced.iter().map(|(_, _, zb)| *zb), &thresholds);
                let details = reduced
                    .iter()
                    .map(|(b, resolved, zb)| {
                        let (current, flag) = shunt_current(*zb, v, &thresholds);
                        let flow = match flag {
                            DetailFlag::Normal => Flow::Finite(current),
                            DetailFlag::Short if current.is_finite() => Flow::Finite(current),
                            DetailFlag::Short => Flow::Unbounded,
                            DetailFlag::Open if zb.is_infinite() => Flow::Blocked,
                            DetailFlag::Open => Flow::Finite(current),
                            DetailFlag::Indeterminate => Flow::Undefined,
                        };
                        BranchDetail {
                            index: *b,
                            impedance: *zb,
                            voltage: v,
                            current,
                            flag,
                            elements: chain_details(resolved, flow, v, &thresholds),
                        }
                    })
                    .collect();
                (z, Vec::new(), details)
            }
        };

        let (total_current, state) = total_current(total_impedance, v, &thresholds);
        match state {
            CircuitState::ShortCircuit => tracing::info!("network is short-circuited"),
            CircuitState::OpenCircuit => tracing::info!("network is open-circuited"),
            CircuitState::Indeterminate => tracing::warn!("total impedance is indeterminate"),
            CircuitState::Normal => {}
        }

        let power = PowerSummary::from_phasors(v, total_current, total_impedance, &thresholds);
        let mut errors = Vec::new();
        if power.is_indeterminate() {
            errors.push(CircuitError::IndeterminateResult);
        }
        tracing::debug!(
            z_re = total_impedance.re,
            z_im = total_impedance.im,
            p = power.active,
            q = power.reactive,
            "solve complete"
        );

        Ok(SolveResult {
            calc_ok: true,
            topology: kind,
            frequency_hz: source.frequency,
            source_voltage: v,
            total_impedance,
            total_current,
            state,
            power,
            elements,
            branches,
            errors,
        })
    }

    fn resolve_flat(
        &mut self,
        components: &[Component],
        frequency_hz: Scalar,
    ) -> Result<Vec<ResolvedElement>, CircuitError> {
        self.resolve_chain(
            components
                .iter()
                .enumerate()
                .map(|(i, component)| (ElementLocation::flat(i), component.designator(i), component)),
            frequency_hz,
        )
    }

    fn resolve_chain<'a, I>(&mut self, items: I, frequency_hz: Scalar) -> Result<Vec<ResolvedElement>, CircuitError>
    where
        I: IntoIterator<Item = (ElementLocation, String, &'a Component)>,
    {
        let thresholds = self.config.thresholds;
        items
            .into_iter()
            .map(|(location, designator, component)| {
                let resolved = match self.cache.as_mut() {
                    Some(cache) => cache.resolve(component, frequency_hz),
                    None => resolve_with(component, frequency_hz, &thresholds),
                }
                .map_err(|err| CircuitError::at(location, err))?;
                tracing::debug!(element = %designator, label = %resolved.label, "resolved element");
                Ok(ResolvedElement {
                    location,
                    designator,
                    kind: component.kind(),
                    resolved,
                })
            })
            .collect()
    }
}

/// Solves `circuit` with the default configuration.
#[must_use]
pub fn solve(circuit: &Circuit) -> SolveResult {
    NetworkSolver::default().solve(circuit)
}

/// Solves `circuit` with `config`.
#[must_use]
pub fn solve_with(circuit: &Circuit, config: &SolverConfig) -> SolveResult {
    NetworkSolver::new(config.clone()).solve(circuit)
}

/// Ohm's law at the source terminals with explicit short/open handling.
fn total_current(z: CScalar, v: CScalar, thresholds: &Thresholds) -> (CScalar, CircuitState) {
    if z.is_nan() {
        (Complex::new(Scalar::NAN, Scalar::NAN), CircuitState::Indeterminate)
    } else if thresholds.is_short(z) {
        let current = if thresholds.is_negligible_voltage(v) {
            CScalar::default()
        } else {
            v / thresholds.near_zero_impedance
        };
        (current, CircuitState::ShortCircuit)
    } else if thresholds.is_open(z) {
        (CScalar::default(), CircuitState::OpenCircuit)
    } else {
        (v / z, CircuitState::Normal)
    }
}

fn flow_of(state: CircuitState, current: CScalar) -> Flow {
    match state {
        CircuitState::Normal | CircuitState::ShortCircuit => Flow::Finite(current),
        CircuitState::OpenCircuit => Flow::Blocked,
        CircuitState::Indeterminate => Flow::Undefined,
    }
}

/// Current through an impedance connected directly across `v`.
/// A short with non-negligible voltage is reported as `+∞` current. An open
/// impedance that is still finite keeps its leakage current `v / z`.
fn shunt_current(z: CScalar, v: CScalar, thresholds: &Thresholds) -> (CScalar, DetailFlag) {
    if z.is_nan() {
        (Complex::new(Scalar::NAN, Scalar::NAN), DetailFlag::Indeterminate)
    } else if thresholds.is_short(z) {
        let current = if thresholds.is_negligible_voltage(v) {
            CScalar::default()
        } else {
            Complex::new(Scalar::INFINITY, 0.0)
        };
        (current, DetailFlag::Short)
    } else if thresholds.is_open(z) {
        let current = if z.is_infinite() { CScalar::default() } else { v / z };
        (current, DetailFlag::Open)
    } else {
        (v / z, DetailFlag::Normal)
    }
}

/// Element voltages and currents along a series chain driven by `v_across`.
fn chain_details(
    elements: &[ResolvedElement],
    flow: Flow,
    v_across: CScalar,
    thresholds: &Thresholds,
) -> Vec<ElementDetail> {
    let nan = Complex::new(Scalar::NAN, Scalar::NAN);
    match flow {
        Flow::Finite(current) => elements
            .iter()
            .map(|e| {
                let flag = if thresholds.is_short(e.impedance()) {
                    DetailFlag::Short
                } else {
                    DetailFlag::Normal
                };
                e.detail(current * e.impedance(), current, flag)
            })
            .collect(),
        Flow::Blocked => {
            // The whole chain voltage sits across the open element(s).
            let opens = elements
                .iter()
                .filter(|e| thresholds.is_open(e.impedance()))
                .count();
            if opens == 0 {
                // Only the sum crosses the open cutoff: split as a divider.
                let chain = series_impedance(elements.iter().map(ResolvedElement::impedance));
                return elements
                    .iter()
                    .map(|e| {
                        let share = v_across * e.impedance() / chain;
                        e.detail(share, CScalar::default(), DetailFlag::Normal)
                    })
                    .collect();
            }
            elements
                .iter()
                .map(|e| {
                    if !thresholds.is_open(e.impedance()) {
                        e.detail(CScalar::default(), CScalar::default(), DetailFlag::Normal)
                    } else if opens == 1 {
                        e.detail(v_across, CScalar::default(), DetailFlag::Open)
                    } else {
                        e.detail(nan, CScalar::default(), DetailFlag::Indeterminate)
                    }
                })
                .collect()
        }
        Flow::Unbounded => {
            let infinite = Complex::new(Scalar::INFINITY, 0.0);
            elements
                .iter()
                .map(|e| {
                    if thresholds.is_short(e.impedance()) {
                        e.detail(CScalar::default(), infinite, DetailFlag::Short)
                    } else {
                        e.detail(nan, infinite, DetailFlag::Indeterminate)
                    }
                })
                .collect()
        }
        Flow::Undefined => elements
            .iter()
            .map(|e| e.detail(nan, nan, DetailFlag::Indeterminate))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::circuits::network::Branch;

    fn thresholds() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn series_rl_matches_hand_calculation() {
        let circuit = Circuit::series(
            [Component::resistor(10.0), Component::inductor(26.53e-3)],
            Source::rms(127.0, 60.0),
        );
        let result = solve(&circuit);
        assert!(result.calc_ok);
        assert_eq!(result.state, CircuitState::Normal);
        assert_relative_eq!(result.total_impedance.re, 10.0, epsilon = 1.0e-9);
        assert_relative_eq!(result.total_impedance.im, 10.0, epsilon = 2.0e-3);
        assert_eq!(result.power.character, LoadCharacter::Lagging);
        assert_eq!(result.elements.len(), 2);
        let v_sum = result.elements[0].voltage + result.elements[1].voltage;
        assert_relative_eq!(v_sum.re, 127.0, epsilon = 1.0e-9);
        assert_relative_eq!(v_sum.im, 0.0, epsilon = 1.0e-9);
    }

    #[test]
    fn parallel_element_currents_sum_to_total() {
        let circuit = Circuit::parallel(
            [Component::resistor(20.0), Component::capacitor(100.0e-6)],
            Source::rms(10.0, 50.0),
        );
        let result = solve(&circuit);
        let sum: CScalar = result.elements.iter().map(|e| e.current).sum();
        assert_relative_eq!(sum.re, result.total_current.re, epsilon = 1.0e-9);
        assert_relative_eq!(sum.im, result.total_current.im, epsilon = 1.0e-9);
        assert_eq!(result.power.character, LoadCharacter::Leading);
        assert!(result.elements.iter().all(|e| e.voltage == Complex::new(10.0, 0.0)));
    }

    #[test]
    fn parallel_short_element_reports_infinite_current() {
        let circuit = Circuit::parallel(
            [Component::resistor(0.0), Component::resistor(5.0)],
            Source::rms(10.0, 60.0),
        );
        let result = solve(&circuit);
        assert_eq!(result.total_impedance, Complex::new(0.0, 0.0));
        assert_eq!(result.state, CircuitState::ShortCircuit);
        assert_eq!(result.elements[0].flag, DetailFlag::Short);
        assert!(result.elements[0].current.re.is_infinite());
        assert_relative_eq!(result.elements[1].current.re, 2.0);
        assert!(result.total_current.is_finite());
        assert!(result.total_current.re > 1.0e9);
        assert_relative_eq!(result.total_current.im, 0.0);
    }

    #[test]
    fn short_with_zero_source_draws_no_current() {
        let circuit = Circuit::series([Component::resistor(0.0)], Source::rms(0.0, 60.0));
        let result = solve(&circuit);
        assert!(result.calc_ok);
        assert_eq!(result.total_current, CScalar::default());
        assert_eq!(result.power.power_factor, PowerFactor::UnityZeroPower);
    }

    #[test]
    fn series_open_puts_source_voltage_across_the_open_element() {
        let thresholds = Thresholds {
            min_reactive_value: 1.0e-300,
            ..thresholds()
        };
        let config = SolverConfig::default().with_thresholds(thresholds);
        let circuit = Circuit::series(
            [Component::resistor(10.0), Component::capacitor(1.0e-200)],
            Source::rms(5.0, 1.0e-200),
        );
        let result = solve_with(&circuit, &config);
        assert_eq!(result.state, CircuitState::OpenCircuit);
        assert_eq!(result.total_current, CScalar::default());
        assert_eq!(result.elements[0].voltage, CScalar::default());
        assert_eq!(result.elements[1].flag, DetailFlag::Open);
        assert_eq!(result.elements[1].voltage, Complex::new(5.0, 0.0));
        assert_eq!(result.power.power_factor, PowerFactor::UnityZeroPower);
    }

    #[test]
    fn ideal_open_element_blocks_series_chain() {
        let circuit = Circuit::series(
            [Component::resistor(10.0), Component::impedance_polar(Scalar::INFINITY, 0.0)],
            Source::rms(5.0, 60.0),
        );
        let result = solve(&circuit);
        assert!(result.calc_ok);
        assert_eq!(result.state, CircuitState::OpenCircuit);
        assert_eq!(result.total_current, CScalar::default());
        assert_eq!(result.elements[0].flag, DetailFlag::Normal);
        assert_eq!(result.elements[1].flag, DetailFlag::Open);
        assert_eq!(result.elements[1].voltage, Complex::new(5.0, 0.0));
    }

    #[test]
    fn chain_past_open_cutoff_divides_voltage() {
        let circuit = Circuit::series(
            [Component::resistor(6.0e11), Component::resistor(6.0e11)],
            Source::rms(100.0, 60.0),
        );
        let result = solve(&circuit);
        assert_eq!(result.state, CircuitState::OpenCircuit);
        assert_eq!(result.total_current, CScalar::default());
        for element in &result.elements {
            assert_eq!(element.flag, DetailFlag::Normal);
            assert_relative_eq!(element.voltage.re, 50.0, max_relative = 1.0e-12);
        }
        let v_sum: CScalar = result.elements.iter().map(|e| e.voltage).sum();
        assert_relative_eq!(v_sum.re, 100.0, max_relative = 1.0e-12);
    }

    #[test]
    fn many_high_impedance_members_conduct_in_parallel() {
        let circuit = Circuit::parallel(vec![Component::resistor(5.0e12); 10], Source::rms(100.0, 60.0));
        let result = solve(&circuit);
        assert_eq!(result.state, CircuitState::Normal);
        assert_relative_eq!(result.total_impedance.re, 5.0e11, max_relative = 1.0e-12);
        assert_relative_eq!(result.total_current.re, 2.0e-10, max_relative = 1.0e-12);
        let leakage: CScalar = result.elements.iter().map(|e| e.current).sum();
        assert_relative_eq!(leakage.re, result.total_current.re, max_relative = 1.0e-12);
        assert!(result.elements.iter().all(|e| e.flag == DetailFlag::Open));
    }

    #[test]
    fn mixed_open_branch_carries_no_current() {
        let circuit = Circuit::mixed(
            [
                Branch::new([Component::resistor(10.0), Component::impedance_text("inf")]),
                Branch::new([Component::resistor(10.0)]),
            ],
            Source::rms(20.0, 60.0),
        );
        let result = solve(&circuit);
        assert_eq!(result.state, CircuitState::Normal);
        assert_relative_eq!(result.total_impedance.re, 10.0, max_relative = 1.0e-12);
        let open = &result.branches[0];
        assert_eq!(open.flag, DetailFlag::Open);
        assert_eq!(open.current, CScalar::default());
        assert_eq!(open.elements[0].voltage, CScalar::default());
        assert_eq!(open.elements[1].flag, DetailFlag::Open);
        assert_eq!(open.elements[1].voltage, Complex::new(20.0, 0.0));
        assert_relative_eq!(result.branches[1].current.re, 2.0, max_relative = 1.0e-12);
    }

    #[test]
    fn mixed_reports_branches_and_drill_down() {
        let circuit = Circuit::mixed(
            [
                Branch::new([Component::resistor(10.0)]),
                Branch::default(),
                Branch::new([Component::resistor(6.0), Component::inductor(8.0 / (2.0 * std::f64::consts::PI * 50.0))]),
            ],
            Source::rms(100.0, 50.0),
        );
        let result = solve(&circuit);
        assert!(result.calc_ok);
        assert!(result.elements.is_empty());
        assert_eq!(result.branches.len(), 2);
        assert_eq!(result.branches[1].index, 2);
        assert_relative_eq!(result.branches[0].current.re, 10.0, epsilon = 1.0e-12);
        assert_relative_eq!(result.branches[1].current.norm(), 10.0, epsilon = 1.0e-9);
        let drill = &result.branches[1].elements;
        assert_eq!(drill[0].designator, "B3.R1");
        assert_eq!(drill[1].designator, "B3.L2");
        let v_sum = drill[0].voltage + drill[1].voltage;
        assert_relative_eq!(v_sum.re, 100.0, epsilon = 1.0e-9);
        let total = result.branches[0].current + result.branches[1].current;
        assert_relative_eq!(total.re, result.total_current.re, epsilon = 1.0e-9);
        assert_relative_eq!(total.im, result.total_current.im, epsilon = 1.0e-9);
    }

    #[test]
    fn mixed_shorted_branch_is_flagged() {
        let circuit = Circuit::mixed(
            [
                Branch::new([Component::resistor(0.0), Component::resistor(0.0)]),
                Branch::new([Component::resistor(10.0)]),
            ],
            Source::rms(10.0, 60.0),
        );
        let result = solve(&circuit);
        assert_eq!(result.total_impedance, CScalar::default());
        assert_eq!(result.branches[0].flag, DetailFlag::Short);
        assert!(result.branches[0].current.re.is_infinite());
        assert!(result.branches[0]
            .elements
            .iter()
            .all(|e| e.flag == DetailFlag::Short && e.voltage == CScalar::default()));
    }

    #[test]
    fn element_failure_aborts_with_location() {
        let circuit = Circuit::mixed(
            [
                Branch::new([Component::resistor(10.0)]),
                Branch::new([Component::resistor(1.0), Component::inductor(-1.0)]),
            ],
            Source::rms(10.0, 60.0),
        );
        let result = solve(&circuit);
        assert!(!result.calc_ok);
        assert!(result.branches.is_empty());
        assert!(result.total_impedance.is_nan());
        assert_eq!(result.errors.len(), 1);
        match &result.errors[0] {
            CircuitError::InvalidElementValue { location, kind, .. } => {
                assert_eq!(*location, ElementLocation::in_branch(1, 1));
                assert_eq!(*kind, ElementKind::Inductor);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(result.messages()[0].starts_with("branch 2, element 2 (inductor)"));
    }

    #[test]
    fn invalid_frequency_and_source_abort() {
        let bad_f = solve(&Circuit::series([Component::resistor(1.0)], Source::rms(1.0, 0.0)));
        assert_eq!(bad_f.errors, vec![CircuitError::InvalidFrequency(0.0)]);
        let bad_v = solve(&Circuit::series([Component::resistor(1.0)], Source::rms(-3.0, 60.0)));
        assert_eq!(bad_v.errors, vec![CircuitError::InvalidSource(-3.0)]);
    }

    #[test]
    fn indeterminate_current_marks_power_indeterminate() {
        let nan = Complex::new(Scalar::NAN, 0.0);
        let power = PowerSummary::from_phasors(Complex::new(1.0, 0.0), nan, Complex::new(1.0, 1.0), &thresholds());
        assert!(power.is_indeterminate());
        assert!(power.complex.is_nan());
        assert_eq!(power.power_factor.value(), None);
        assert_eq!(power.character, LoadCharacter::Lagging);
        assert_eq!(power.power_factor.to_string(), "Indeterminate");
    }

    #[test]
    fn nan_total_impedance_is_indeterminate_state() {
        let (current, state) = total_current(Complex::new(Scalar::NAN, 0.0), Complex::new(1.0, 0.0), &thresholds());
        assert_eq!(state, CircuitState::Indeterminate);
        assert!(current.is_nan());
    }

    #[test]
    fn load_character_uses_small_angle_cutoff() {
        let t = thresholds();
        assert_eq!(LoadCharacter::from_impedance(Complex::new(10.0, 0.0), &t), LoadCharacter::Unity);
        assert_eq!(LoadCharacter::from_impedance(Complex::new(10.0, 1.0e-12), &t), LoadCharacter::Unity);
        assert_eq!(LoadCharacter::from_impedance(Complex::new(10.0, 1.0), &t), LoadCharacter::Lagging);
        assert_eq!(LoadCharacter::from_impedance(Complex::new(10.0, -1.0), &t), LoadCharacter::Leading);
        assert_eq!(
            LoadCharacter::from_impedance(Complex::new(Scalar::INFINITY, 0.0), &t),
            LoadCharacter::Unity
        );
    }

    #[test]
    fn memoized_solver_matches_plain_solver() {
        let circuit = Circuit::series(
            [Component::capacitor(1.0e-6), Component::capacitor(1.0e-6), Component::resistor(5.0)],
            Source::rms(1.0, 1.0e3),
        );
        let mut memo = NetworkSolver::new(SolverConfig::default().with_memoization(true));
        let cached = memo.solve(&circuit);
        assert_eq!(cached, solve(&circuit));
        let cache = memo.cache().expect("memoization enabled");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn phasor_listing_covers_every_element() {
        let circuit = Circuit::series(
            [Component::resistor(3.0), Component::impedance_text("0+4j")],
            Source::rms(10.0, 60.0),
        );
        let labels: Vec<String> = solve(&circuit).phasors().into_iter().map(|p| p.label).collect();
        assert_eq!(labels, ["V_source", "I_total", "V_R1", "I_R1", "V_Z2", "I_Z2"]);
    }

    #[test]
    fn report_mentions_power_factor_character() {
        let circuit = Circuit::series([Component::resistor(3.0), Component::capacitor(1.0e-3)], Source::rms(10.0, 60.0));
        let report = solve(&circuit).to_string();
        assert!(report.contains("PF: "));
        assert!(report.contains("(leading)"));
        assert!(report.starts_with("series circuit at 60 Hz\n"));
        assert!(report.contains("  V_source: 10.0000∠0.00° V\n"));
        assert!(report.contains("R1 [R=3.0000 Ω]: V="));
    }
}
