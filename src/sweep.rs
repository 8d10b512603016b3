//! Frequency sweep driver and Bode post-processing helpers.
//!
//! A sweep is repeated single-frequency solves of one circuit; every point is
//! independent, so the `parallel` feature can spread them over a thread pool.

use num_complex::Complex;

use crate::circuits::analysis::{CircuitState, NetworkSolver};
use crate::circuits::network::Circuit;
use crate::config::{SolverConfig, Thresholds};
use crate::math::{self, CScalar, Scalar};

/// Number of points in a Bode sweep built by [`bode_frequencies`].
pub const BODE_POINTS: usize = 200;
/// Magnitude (dB) reported for open (+) and shorted (−) networks in Bode data.
pub const BODE_CLAMP_DB: Scalar = 100.0;

/// Generates `n` linearly spaced samples in [start, stop].
#[must_use]
pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as Scalar - 1.0);
            (0..n).map(|i| start + step * i as Scalar).collect()
        }
    }
}

/// Generates `n` logarithmically spaced samples between `start` and `stop` (Hz).
/// Returns an empty vector unless both bounds are positive.
#[must_use]
pub fn logspace_hz(start_hz: Scalar, stop_hz: Scalar, n: usize) -> Vec<Scalar> {
    if !(start_hz > 0.0 && stop_hz > 0.0) {
        return Vec::new();
    }
    match n {
        0 => Vec::new(),
        1 => vec![start_hz],
        _ => {
            let log_start = start_hz.log10();
            let log_stop = stop_hz.log10();
            let step = (log_stop - log_start) / (n as Scalar - 1.0);
            (0..n)
                .map(|i| 10f64.powf(log_start + step * i as Scalar))
                .collect()
        }
    }
}

/// Bode sweep around `base_hz`: [`BODE_POINTS`] log-spaced points from
/// `max(1, base/100)` to `base·100` Hz.
#[must_use]
pub fn bode_frequencies(base_hz: Scalar) -> Vec<Scalar> {
    let f_min = (base_hz / 100.0).max(1.0);
    let f_max = base_hz * 100.0;
    logspace_hz(f_min, f_max, BODE_POINTS)
}

/// Magnitude of complex sequence.
#[must_use]
pub fn mag(values: impl IntoIterator<Item = CScalar>) -> Vec<Scalar> {
    values.into_iter().map(|v| v.norm()).collect()
}

/// Magnitude in dB (20*log10(|x|)), clamping very small values.
#[must_use]
pub fn mag_db(values: impl IntoIterator<Item = CScalar>) -> Vec<Scalar> {
    const MIN: Scalar = 1e-300;
    values
        .into_iter()
        .map(|v| 20.0 * (v.norm().max(MIN)).log10())
        .collect()
}

/// Phase in degrees of complex sequence.
#[must_use]
pub fn phase_deg(values: impl IntoIterator<Item = CScalar>) -> Vec<Scalar> {
    values.into_iter().map(math::phase_deg).collect()
}

/// Impedance magnitude in dB for Bode plots: `+100` for open, `−100` for shorted,
/// NaN when the value is NaN.
#[must_use]
pub fn bode_magnitude_db(z: CScalar, thresholds: &Thresholds) -> Scalar {
    if z.is_nan() {
        Scalar::NAN
    } else if thresholds.is_open(z) {
        BODE_CLAMP_DB
    } else if thresholds.is_short(z) {
        -BODE_CLAMP_DB
    } else {
        20.0 * z.norm().log10()
    }
}

/// Result of solving a circuit at one sweep frequency.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    /// Frequency (Hz).
    pub frequency_hz: Scalar,
    /// Total impedance (Ω).
    pub impedance: CScalar,
    /// Total current (A).
    pub current: CScalar,
    /// Short/open classification at this frequency.
    pub state: CircuitState,
    /// False when the solve at this frequency was aborted.
    pub calc_ok: bool,
}

impl SweepPoint {
    /// |Z| (Ω).
    #[must_use]
    pub fn impedance_magnitude(&self) -> Scalar {
        self.impedance.norm()
    }

    /// Phase of Z (degrees).
    #[must_use]
    pub fn impedance_phase_deg(&self) -> Scalar {
        math::phase_deg(self.impedance)
    }

    /// |I| (A).
    #[must_use]
    pub fn current_magnitude(&self) -> Scalar {
        self.current.norm()
    }

    /// Phase of I (degrees).
    #[must_use]
    pub fn current_phase_deg(&self) -> Scalar {
        math::phase_deg(self.current)
    }
}

fn sweep_point(solver: &mut NetworkSolver, circuit: &Circuit, frequency_hz: Scalar) -> SweepPoint {
    let result = solver.solve(&circuit.at_frequency(frequency_hz));
    SweepPoint {
        frequency_hz,
        impedance: result.total_impedance,
        current: result.total_current,
        state: result.state,
        calc_ok: result.calc_ok,
    }
}

/// Solves `circuit` at every frequency with the default configuration.
#[must_use]
pub fn frequency_sweep<I>(circuit: &Circuit, frequencies: I) -> Vec<SweepPoint>
where
    I: IntoIterator<Item = Scalar>,
{
    frequency_sweep_with(circuit, frequencies, &SolverConfig::default())
}

/// Solves `circuit` at every frequency with `config`.
#[must_use]
pub fn frequency_sweep_with<I>(circuit: &Circuit, frequencies: I, config: &SolverConfig) -> Vec<SweepPoint>
where
    I: IntoIterator<Item = Scalar>,
{
    let mut solver = NetworkSolver::new(config.clone());
    let points: Vec<SweepPoint> = frequencies
        .into_iter()
        .map(|f| sweep_point(&mut solver, circuit, f))
        .collect();
    tracing::debug!(points = points.len(), "frequency sweep complete");
    points
}

/// Parallel variant of [`frequency_sweep_with`]; each worker owns its solver.
#[cfg(feature = "parallel")]
#[must_use]
pub fn par_frequency_sweep(circuit: &Circuit, frequencies: &[Scalar], config: &SolverConfig) -> Vec<SweepPoint> {
    use rayon::prelude::*;

    tracing::debug!(
        points = frequencies.len(),
        threads = rayon::current_num_threads(),
        "parallel frequency sweep"
    );
    frequencies
        .par_iter()
        .map_init(
            || NetworkSolver::new(config.clone()),
            |solver, &f| sweep_point(solver, circuit, f),
        )
        .collect()
}

/// Bode magnitude (dB) for each sweep point, clamped for open/short networks.
#[must_use]
pub fn bode_magnitudes(points: &[SweepPoint], thresholds: &Thresholds) -> Vec<Scalar> {
    points
        .iter()
        .map(|p| {
            if p.calc_ok {
                bode_magnitude_db(p.impedance, thresholds)
            } else {
                Scalar::NAN
            }
        })
        .collect()
}

/// Impedances of every point, for use with [`mag`], [`mag_db`] and [`phase_deg`].
#[must_use]
pub fn impedances(points: &[SweepPoint]) -> Vec<Complex<Scalar>> {
    points.iter().map(|p| p.impedance).collect()
}
