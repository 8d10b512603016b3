//! Persistence and export helpers for circuit descriptions and solver output.

pub mod csv;

#[cfg(feature = "serde")]
pub mod json;

pub use self::csv::*;

#[cfg(feature = "serde")]
pub use self::json::*;
