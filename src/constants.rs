//! Baseline constants and numerical thresholds shared by the resolver and the solver.
//!
//! ## Thresholds
//!
//! Every near-zero or near-infinite decision in the crate goes through one of the
//! constants below (or through a [`crate::config::Thresholds`] value seeded from
//! them). The reducer, the current derivation and the power derivation all read
//! the same set, so a network classified as shorted while reducing is also
//! treated as shorted while deriving its current.
//!
//! | Constant                       | Value   | Meaning                                      |
//! |--------------------------------|---------|----------------------------------------------|
//! | [`NEAR_ZERO_IMPEDANCE`]        | 1e-9 Ω  | below this an element or network is a short  |
//! | [`NEAR_ZERO_POWER`]            | 1e-9 VA | below this the power factor is unity         |
//! | [`OPEN_CIRCUIT_IMPEDANCE`]     | 1e12 Ω  | above this an element or network is open     |
//! | [`UNITY_PHASE_DEG`]            | 1e-6 °  | below this the load is classified as unity   |
//! | [`MIN_REACTIVE_VALUE`]         | 1e-15   | smallest accepted inductance or capacitance  |

use std::f64::consts::PI;

use crate::math::Scalar;

/// Impedance magnitude (Ω) below which an element, branch or network is a short circuit.
/// Also used as the near-zero cutoff for source voltage magnitudes.
pub const NEAR_ZERO_IMPEDANCE: Scalar = 1.0e-9;
/// Apparent power (VA) below which the power factor is reported as unity.
pub const NEAR_ZERO_POWER: Scalar = 1.0e-9;
/// Impedance magnitude (Ω) above which an element, branch or network is an open circuit.
pub const OPEN_CIRCUIT_IMPEDANCE: Scalar = 1.0e12;
/// Impedance phase (degrees) below which a load is classified as unity power factor.
pub const UNITY_PHASE_DEG: Scalar = 1.0e-6;
/// Smallest inductance (H) or capacitance (F) accepted by the resolver.
pub const MIN_REACTIVE_VALUE: Scalar = 1.0e-15;

/// Returns the angular frequency corresponding to a linear frequency `hz`.
#[inline]
#[must_use]
pub fn angular_frequency(hz: Scalar) -> Scalar {
    2.0 * PI * hz
}
