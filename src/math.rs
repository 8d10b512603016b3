//! Shared numerical primitives for phasor arithmetic and complex-number text forms.

use num_complex::Complex;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Primary complex scalar type used for phasors and impedances.
pub type CScalar = Complex<Scalar>;

/// Builds a phasor from a magnitude and an angle in degrees.
///
/// An infinite magnitude yields [`open_circuit`] whatever the angle.
#[must_use]
pub fn phasor_deg(magnitude: Scalar, angle_deg: Scalar) -> CScalar {
    if magnitude == Scalar::INFINITY {
        return open_circuit();
    }
    Complex::from_polar(magnitude, angle_deg.to_radians())
}

/// Impedance of an ideal open, `(+∞, 0)`.
#[must_use]
pub const fn open_circuit() -> CScalar {
    Complex::new(Scalar::INFINITY, 0.0)
}

/// Computes the RMS magnitude of a sinusoidal waveform with peak value `peak`.
#[must_use]
pub fn sinusoid_rms(peak: Scalar) -> Scalar {
    peak / Scalar::sqrt(2.0)
}

/// Computes the peak magnitude of a sinusoidal waveform with RMS value `rms`.
#[must_use]
pub fn sinusoid_peak(rms: Scalar) -> Scalar {
    rms * Scalar::sqrt(2.0)
}

/// Phase of `z` in degrees.
#[must_use]
pub fn phase_deg(z: CScalar) -> Scalar {
    z.arg().to_degrees()
}

/// Renders `z` as `magnitude∠angle°` with four and two decimals.
#[must_use]
pub fn format_polar(z: CScalar) -> String {
    format!("{:.4}∠{:.2}°", z.norm(), phase_deg(z))
}

/// Renders `z` in the rectangular `a±bj` form accepted by [`parse_complex`].
///
/// Formatting a value that was itself parsed from this output yields the same text.
#[must_use]
pub fn format_rectangular(z: CScalar) -> String {
    let sign = if z.im.is_sign_negative() { '-' } else { '+' };
    format!("{:.4}{}{:.4}j", z.re, sign, z.im.abs())
}

/// Parses a rectangular complex number such as `3+4j`, `3 - 4i`, `-j2.5`, `(10+0j) Ω`.
///
/// Whitespace, enclosing parentheses and ohm markers (`Ω`, `ohm`, `ohms`) are ignored,
/// `i` and `j` are both accepted as the imaginary unit and either part may be omitted.
/// A bare `inf` or `∞` declares an ideal open, `(+∞, 0)`.
/// Returns `None` for empty or malformed input and for any other non-finite value.
#[must_use]
pub fn parse_complex(text: &str) -> Option<CScalar> {
    let mut s: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    for marker in ["ohms", "ohm", "\u{3a9}", "\u{2126}", "\u{3c9}"] {
        s = s.replace(marker, "");
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        s = inner.to_string();
    }
    if matches!(s.trim_start_matches('+'), "inf" | "infinity" | "\u{221e}") {
        return Some(open_circuit());
    }
    let s = s.replace('i', "j");

    let split = s
        .char_indices()
        .filter(|&(i, c)| (c == '+' || c == '-') && i > 0 && !s[..i].ends_with('e'))
        .map(|(i, _)| i)
        .last();

    let (re, im) = match split {
        Some(i) => {
            let (a, b) = s.split_at(i);
            match (a.contains('j'), b.contains('j')) {
                (false, true) => (parse_real(a)?, parse_imag(b)?),
                (true, false) => (parse_real(b)?, parse_imag(a)?),
                _ => return None,
            }
        }
        None if s.contains('j') => (0.0, parse_imag(&s)?),
        None => (parse_real(&s)?, 0.0),
    };

    (re.is_finite() && im.is_finite()).then(|| Complex::new(re, im))
}

fn parse_real(token: &str) -> Option<Scalar> {
    if token.is_empty() {
        return None;
    }
    token.parse::<Scalar>().ok()
}

fn parse_imag(token: &str) -> Option<Scalar> {
    if token.matches('j').count() != 1 {
        return None;
    }
    let (sign, body) = match token.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, token.strip_prefix('+').unwrap_or(token)),
    };
    let digits = body
        .strip_suffix('j')
        .or_else(|| body.strip_prefix('j'))?;
    if digits.is_empty() {
        return Some(sign);
    }
    if digits.starts_with(['+', '-']) {
        return None;
    }
    digits.parse::<Scalar>().ok().map(|v| sign * v)
}
