//! Shared error types used across submodules.

use std::fmt;

use thiserror::Error;

use crate::circuits::component::ElementKind;
use crate::circuits::network::TopologyKind;
use crate::math::Scalar;

/// Failure raised while resolving a single component's impedance.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// Frequency is not a finite number greater than zero.
    #[error("invalid frequency {0} Hz: must be a finite value greater than zero")]
    InvalidFrequency(Scalar),
    /// A parameter is outside the domain of its component type.
    #[error("invalid {kind} value: {reason}")]
    InvalidElementValue {
        /// Offending component type.
        kind: ElementKind,
        /// Human-readable description of the violated constraint.
        reason: String,
    },
}

/// Position of an element inside a circuit.
///
/// Indices are zero-based; `Display` renders them one-based for messages.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementLocation {
    /// Branch index (Mixed topology only).
    pub branch: Option<usize>,
    /// Element index within its list or branch.
    pub index: usize,
}

impl ElementLocation {
    /// Location of an element in a flat Series/Parallel list.
    #[must_use]
    pub const fn flat(index: usize) -> Self {
        Self { branch: None, index }
    }

    /// Location of an element inside a Mixed branch.
    #[must_use]
    pub const fn in_branch(branch: usize, index: usize) -> Self {
        Self {
            branch: Some(branch),
            index,
        }
    }
}

impl fmt::Display for ElementLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.branch {
            Some(branch) => write!(f, "branch {}, element {}", branch + 1, self.index + 1),
            None => write!(f, "element {}", self.index + 1),
        }
    }
}

/// Top-level error taxonomy for a solve.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CircuitError {
    /// Source frequency is not a finite number greater than zero.
    #[error("invalid frequency {0} Hz: must be a finite value greater than zero")]
    InvalidFrequency(Scalar),
    /// A component parameter is outside the domain of its type.
    #[error("{location} ({kind}): {reason}")]
    InvalidElementValue {
        /// Where the offending component sits in the circuit.
        location: ElementLocation,
        /// Offending component type.
        kind: ElementKind,
        /// Human-readable description of the violated constraint.
        reason: String,
    },
    /// Source magnitude is negative or not a finite number.
    #[error("invalid source magnitude {0}: must be a finite value of at least zero")]
    InvalidSource(Scalar),
    /// Nothing to compute for the requested topology.
    #[error("{0} circuit is empty: add at least one {}", .0.unit_noun())]
    EmptyTopology(TopologyKind),
    /// Unrecognized topology tag.
    #[error("unknown topology '{0}': expected series, parallel or mixed")]
    UnknownTopology(String),
    /// Total current is not finite, so power quantities are undefined.
    #[error("total current is not finite: power and power factor are indeterminate")]
    IndeterminateResult,
}

impl CircuitError {
    /// Attaches a circuit location to a resolver failure.
    #[must_use]
    pub fn at(location: ElementLocation, err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidFrequency(value) => Self::InvalidFrequency(value),
            ResolveError::InvalidElementValue { kind, reason } => Self::InvalidElementValue {
                location,
                kind,
                reason,
            },
        }
    }

    /// Returns true for errors that abort a solve (everything except indeterminate power).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::IndeterminateResult)
    }
}

/// Convenience alias for results carrying a [`CircuitError`].
pub type Result<T> = std::result::Result<T, CircuitError>;
