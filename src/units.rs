//! Unit symbols and SI-prefix scaling for human-readable labels.

use std::fmt;

use crate::math::Scalar;

/// Physical units that appear in component labels.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Ohm (Ω).
    Ohm,
    /// Henry (H).
    Henry,
    /// Farad (F).
    Farad,
    /// Volt (V).
    Volt,
    /// Ampere (A).
    Ampere,
    /// Hertz (Hz).
    Hertz,
}

impl Unit {
    /// Printable symbol of the unit.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Ohm => "Ω",
            Self::Henry => "H",
            Self::Farad => "F",
            Self::Volt => "V",
            Self::Ampere => "A",
            Self::Hertz => "Hz",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Sub-unit SI prefixes used for inductance and capacitance labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// No prefix (×1).
    None,
    /// milli (×1e-3).
    Milli,
    /// micro (×1e-6).
    Micro,
    /// nano (×1e-9).
    Nano,
    /// pico (×1e-12).
    Pico,
}

impl Prefix {
    /// Multiplier of the prefix.
    #[must_use]
    pub const fn factor(self) -> Scalar {
        match self {
            Self::None => 1.0,
            Self::Milli => 1.0e-3,
            Self::Micro => 1.0e-6,
            Self::Nano => 1.0e-9,
            Self::Pico => 1.0e-12,
        }
    }

    /// Printable prefix symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Milli => "m",
            Self::Micro => "µ",
            Self::Nano => "n",
            Self::Pico => "p",
        }
    }

    /// Picks the largest prefix whose factor does not exceed `|value|`.
    /// Values below one nano-unit always use pico.
    #[must_use]
    pub fn for_value(value: Scalar) -> Self {
        let magnitude = value.abs();
        [Self::None, Self::Milli, Self::Micro, Self::Nano]
            .into_iter()
            .find(|p| magnitude >= p.factor())
            .unwrap_or(Self::Pico)
    }
}

/// Formats `value` with a magnitude-bucketed prefix, e.g. `26.5300 mH`.
#[must_use]
pub fn format_scaled(value: Scalar, unit: Unit) -> String {
    let prefix = Prefix::for_value(value);
    format!("{:.4} {}{}", value / prefix.factor(), prefix.symbol(), unit)
}
