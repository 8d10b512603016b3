#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Named thresholds and frequency helpers.
pub mod constants;
/// Shared phasor arithmetic and complex-number text forms.
pub mod math;
/// Unit symbols and SI-prefix label scaling.
pub mod units;
/// Solver configuration.
pub mod config;
/// Circuit components, topologies and the network solver.
pub mod circuits;
/// Frequency sweep driver and Bode helpers.
pub mod sweep;
/// Persistence and export.
pub mod io;
/// Error types shared between submodules.
pub mod errors;

/// Common exports for downstream crates.
pub mod prelude;
