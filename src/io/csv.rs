//! CSV export of sweep points and phasor listings.

use std::io::{self, Write};

use crate::circuits::analysis::PhasorEntry;
use crate::config::Thresholds;
use crate::math;
use crate::sweep::{bode_magnitude_db, SweepPoint};

/// Writes sweep points as `frequency_hz,ReZ,ImZ,ReI,ImI,calc_ok`.
pub fn write_sweep_csv<W: Write>(mut w: W, points: &[SweepPoint]) -> io::Result<()> {
    writeln!(w, "frequency_hz,ReZ,ImZ,ReI,ImI,calc_ok")?;
    for p in points {
        writeln!(
            w,
            "{:.16e},{:.16e},{:.16e},{:.16e},{:.16e},{}",
            p.frequency_hz, p.impedance.re, p.impedance.im, p.current.re, p.current.im, p.calc_ok
        )?;
    }
    Ok(())
}

/// Writes Bode data as `frequency_hz,mag_db,phase_deg` with open/short clamping.
pub fn write_bode_csv<W: Write>(mut w: W, points: &[SweepPoint], thresholds: &Thresholds) -> io::Result<()> {
    writeln!(w, "frequency_hz,mag_db,phase_deg")?;
    for p in points {
        writeln!(
            w,
            "{:.6e},{:.6},{:.6}",
            p.frequency_hz,
            bode_magnitude_db(p.impedance, thresholds),
            p.impedance_phase_deg()
        )?;
    }
    Ok(())
}

/// Writes a phasor listing as `label,magnitude,angle_deg,re,im`.
pub fn write_phasors_csv<W: Write>(mut w: W, phasors: &[PhasorEntry]) -> io::Result<()> {
    writeln!(w, "label,magnitude,angle_deg,re,im")?;
    for p in phasors {
        writeln!(
            w,
            "{},{:.6e},{:.4},{:.6e},{:.6e}",
            p.label,
            p.phasor.norm(),
            math::phase_deg(p.phasor),
            p.phasor.re,
            p.phasor.im
        )?;
    }
    Ok(())
}
