//! Shared foundational types for the SDI bridge synchronization core.
//!
//! Clock frequencies, the closed set of supported video formats and lane
//! counts, VESA/CEA timing tables, the EAV preamble, and the per-variant
//! timing-generator profiles that the simulator and configuration crates
//! build on.

#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod frequency;
pub mod profile;
pub mod timings;
pub mod trs;

pub use error::FormatError;
pub use format::{FormatVariant, LaneCount, VideoFormat};
pub use frequency::{Frequency, ParseFrequencyError};
pub use profile::{FrameEnd, FvStages, TimingProfile};
pub use timings::{VideoTimings, COUNTER_MAX};
pub use trs::{is_status_byte, EAV_PREAMBLE};
