//! Solver configuration: numerical thresholds and memoization.

use crate::constants::{
    MIN_REACTIVE_VALUE, NEAR_ZERO_IMPEDANCE, NEAR_ZERO_POWER, OPEN_CIRCUIT_IMPEDANCE,
    UNITY_PHASE_DEG,
};
use crate::math::{CScalar, Scalar};

/// Errors that can occur while building or loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Raised when a required parameter is missing.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
    /// Raised when the configuration is internally inconsistent.
    #[error("configuration error: {0}")]
    InvalidConfig(String),
    /// Raised when a serialized configuration cannot be decoded.
    #[cfg(feature = "serde")]
    #[error("configuration decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Numerical cutoffs shared by reduction, current derivation and power derivation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Impedance magnitude (Ω) below which a short circuit is assumed.
    pub near_zero_impedance: Scalar,
    /// Apparent power (VA) below which the power factor is unity.
    pub near_zero_power: Scalar,
    /// Impedance magnitude (Ω) above which an open circuit is assumed.
    pub open_circuit_impedance: Scalar,
    /// Impedance phase (degrees) below which the load is unity.
    pub unity_phase_deg: Scalar,
    /// Smallest accepted inductance or capacitance.
    pub min_reactive_value: Scalar,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            near_zero_impedance: NEAR_ZERO_IMPEDANCE,
            near_zero_power: NEAR_ZERO_POWER,
            open_circuit_impedance: OPEN_CIRCUIT_IMPEDANCE,
            unity_phase_deg: UNITY_PHASE_DEG,
            min_reactive_value: MIN_REACTIVE_VALUE,
        }
    }
}

impl Thresholds {
    /// True when `z` is small enough to be treated as a short circuit.
    #[must_use]
    pub fn is_short(&self, z: CScalar) -> bool {
        z.norm() < self.near_zero_impedance
    }

    /// True when `z` is infinite or above the open-circuit cutoff.
    #[must_use]
    pub fn is_open(&self, z: CScalar) -> bool {
        z.is_infinite() || z.norm() > self.open_circuit_impedance
    }

    /// Admittance magnitude below which a parallel combination is open.
    #[must_use]
    pub fn open_admittance(&self) -> Scalar {
        1.0 / self.open_circuit_impedance
    }

    /// True when a voltage phasor is too small to drive any current.
    #[must_use]
    pub fn is_negligible_voltage(&self, v: CScalar) -> bool {
        v.norm() < self.near_zero_impedance
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("near_zero_impedance", self.near_zero_impedance),
            ("near_zero_power", self.near_zero_power),
            ("open_circuit_impedance", self.open_circuit_impedance),
            ("unity_phase_deg", self.unity_phase_deg),
            ("min_reactive_value", self.min_reactive_value),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidConfig(format!(
                    "{name} must be a finite value greater than zero, got {value}"
                )));
            }
        }
        if self.near_zero_impedance >= self.open_circuit_impedance {
            return Err(ConfigError::InvalidConfig(format!(
                "near_zero_impedance ({:e}) must be below open_circuit_impedance ({:e})",
                self.near_zero_impedance, self.open_circuit_impedance
            )));
        }
        Ok(())
    }
}

/// Configuration for a [`crate::circuits::analysis::NetworkSolver`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Human-readable identifier used in log spans.
    pub name: String,
    /// Numerical cutoffs.
    pub thresholds: Thresholds,
    /// Memoize element resolution by (kind, parameters, frequency).
    pub memoize: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            name: String::from("ac-solve"),
            thresholds: Thresholds::default(),
            memoize: false,
        }
    }
}

impl SolverConfig {
    /// Creates a configuration with default thresholds.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Replaces the thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Enables or disables memoized element resolution.
    #[must_use]
    pub fn with_memoization(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Checks that every threshold is positive and that the cutoffs are ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingParameter("name"));
        }
        self.thresholds.validate()
    }

    /// Reads and validates a configuration from JSON. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}
