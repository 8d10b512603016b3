//! Circuit data model, element impedance resolution and network solving.

/// Single-frequency network solver and its result types.
pub mod analysis;
/// Component definitions.
pub mod component;
/// Group-by-group construction with running totals.
pub mod history;
/// Branches, sources, circuits and series/parallel reduction.
pub mod network;
/// Element impedance resolution and memoization.
pub mod resolve;

pub use analysis::{solve, solve_with, NetworkSolver, SolveResult};
pub use component::{Component, ElementKind, KnownImpedance};
pub use history::{build_history, Connection, HistoryEntry};
pub use network::{Branch, Circuit, Source, Topology, TopologyKind, WaveformReference};
pub use resolve::{resolve, resolve_with, ImpedanceCache, ResolvedImpedance};
