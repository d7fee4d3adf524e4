//! Clock frequencies with unit parsing, display, and period conversion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Femtoseconds per second.
pub const FS_PER_S: u64 = 1_000_000_000_000_000;

/// A clock frequency stored in whole Hertz.
///
/// Parses strings like `"148.5MHz"`, `"50KHz"`, `"1GHz"` and bare numbers
/// (Hz). Fractional inputs are rounded to the nearest Hertz. A frequency is
/// always non-zero, so [`period_fs`](Frequency::period_fs) is well defined.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frequency(u64);

impl Frequency {
    /// Creates a frequency from a value in Hertz. Returns `None` for zero.
    pub fn from_hz(hz: u64) -> Option<Self> {
        (hz > 0).then_some(Self(hz))
    }

    /// Returns the frequency in Hertz.
    pub fn hz(&self) -> u64 {
        self.0
    }

    /// Returns the frequency in megahertz.
    pub fn mhz(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Returns the clock period in femtoseconds, rounded to the nearest femtosecond.
    pub fn period_fs(&self) -> u64 {
        (FS_PER_S + self.0 / 2) / self.0
    }

    /// Returns this frequency multiplied by an integer factor.
    pub fn scaled(&self, factor: u64) -> Self {
        Self(self.0 * factor)
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({self})")
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.0 as f64;
        if self.0 >= 1_000_000_000 {
            write!(f, "{}GHz", hz / 1_000_000_000.0)
        } else if self.0 >= 1_000_000 {
            write!(f, "{}MHz", hz / 1_000_000.0)
        } else if self.0 >= 1_000 {
            write!(f, "{}KHz", hz / 1_000.0)
        } else {
            write!(f, "{}Hz", self.0)
        }
    }
}

/// Error type for parsing frequency strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid frequency: '{input}'")]
pub struct ParseFrequencyError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseFrequencyError {
            input: s.to_string(),
        };

        let lower = s.to_ascii_lowercase();
        let (digits, scale) = [
            ("ghz", 1_000_000_000.0),
            ("mhz", 1_000_000.0),
            ("khz", 1_000.0),
            ("hz", 1.0),
        ]
        .iter()
        .find_map(|(suffix, scale)| lower.strip_suffix(suffix).map(|num| (num, *scale)))
        .unwrap_or((lower.as_str(), 1.0));

        let value: f64 = digits.trim().parse().map_err(|_| err())?;
        let hz = (value * scale).round();
        if !hz.is_finite() || hz < 1.0 || hz > u64::MAX as f64 {
            return Err(err());
        }
        Ok(Frequency(hz as u64))
    }
}
