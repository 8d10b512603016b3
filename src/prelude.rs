//! Convenience re-exports for building and solving AC circuits.

pub use crate::circuits::{
    analysis::{
        BranchDetail, CircuitState, DetailFlag, ElementDetail, LoadCharacter, PhasorEntry,
        PowerFactor, PowerSummary,
    },
    build_history, resolve, resolve_with, solve, solve_with, Branch, Circuit, Component,
    Connection, ElementKind, HistoryEntry, ImpedanceCache, KnownImpedance, NetworkSolver,
    ResolvedImpedance, SolveResult, Source, Topology, TopologyKind, WaveformReference,
};
pub use crate::config::{ConfigError, SolverConfig, Thresholds};
pub use crate::constants::*;
pub use crate::errors::{CircuitError, ElementLocation, ResolveError};
pub use crate::math::{format_polar, format_rectangular, open_circuit, parse_complex, CScalar, Scalar};
pub use crate::sweep::{
    bode_frequencies, bode_magnitude_db, frequency_sweep, frequency_sweep_with, SweepPoint,
};
#[cfg(feature = "parallel")]
pub use crate::sweep::par_frequency_sweep;
