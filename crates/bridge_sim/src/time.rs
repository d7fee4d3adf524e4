//! Simulation time with femtosecond precision.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;
/// Femtoseconds per second.
pub const FS_PER_S: u64 = bridge_common::frequency::FS_PER_S;

/// A point in simulated time, in femtoseconds.
///
/// Clock edges never coincide within a domain, and cross-domain ordering at
/// equal timestamps is resolved by the scheduler, so no delta index is kept.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SimTime {
    /// Simulated time in femtoseconds.
    pub fs: u64,
}

impl SimTime {
    /// Time zero.
    pub const ZERO: SimTime = SimTime { fs: 0 };

    /// Creates a time from a femtosecond value.
    pub fn from_fs(fs: u64) -> Self {
        Self { fs }
    }

    /// Creates a time from a nanosecond value.
    pub fn from_ns(ns: u64) -> Self {
        Self { fs: ns * FS_PER_NS }
    }

    /// Creates a time from a microsecond value.
    pub fn from_us(us: u64) -> Self {
        Self { fs: us * FS_PER_US }
    }

    /// Creates a time from a millisecond value.
    pub fn from_ms(ms: u64) -> Self {
        Self { fs: ms * FS_PER_MS }
    }

    /// Returns this time advanced by `fs` femtoseconds.
    pub fn after(&self, fs: u64) -> Self {
        Self { fs: self.fs + fs }
    }

    /// Converts to nanoseconds (truncated).
    pub fn to_ns(&self) -> u64 {
        self.fs / FS_PER_NS
    }

    /// Converts to fractional microseconds, for reports.
    pub fn as_us_f64(&self) -> f64 {
        self.fs as f64 / FS_PER_US as f64
    }

    /// Converts to fractional milliseconds, for reports.
    pub fn as_ms_f64(&self) -> f64 {
        self.fs as f64 / FS_PER_MS as f64
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fs = self.fs;
        if fs == 0 {
            write!(f, "0 fs")
        } else if fs >= FS_PER_MS && fs.is_multiple_of(FS_PER_MS) {
            write!(f, "{} ms", fs / FS_PER_MS)
        } else if fs >= FS_PER_US && fs.is_multiple_of(FS_PER_US) {
            write!(f, "{} us", fs / FS_PER_US)
        } else if fs >= FS_PER_NS && fs.is_multiple_of(FS_PER_NS) {
            write!(f, "{} ns", fs / FS_PER_NS)
        } else if fs >= FS_PER_PS && fs.is_multiple_of(FS_PER_PS) {
            write!(f, "{} ps", fs / FS_PER_PS)
        } else {
            write!(f, "{fs} fs")
        }
    }
}
