//! Per-variant timing-generator profiles.
//!
//! Every format/lane variant shares one timing generator; what differs is the
//! phase at which the counters are reloaded on sync edges, the depth of the
//! frame-valid pipeline, and how the frame-valid window closes at the end of
//! the frame. A [`TimingProfile`] captures exactly those differences.

use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::format::{FormatVariant, LaneCount, VideoFormat};
use crate::timings::VideoTimings;

/// Number of registers between the combinational frame-valid term and `fv_o`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FvStages {
    /// `fv_o <= fv_c`.
    Single,
    /// `fv_r <= fv_c; fv_o <= fv_r`.
    Double,
}

impl FvStages {
    /// Register count.
    pub fn depth(&self) -> u8 {
        match self {
            FvStages::Single => 1,
            FvStages::Double => 2,
        }
    }
}

/// How the frame-valid window is closed and reopened around vertical blanking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FrameEnd {
    /// A 10-bit saturating hold counter runs through the last line's
    /// horizontal blanking and keeps frame-valid high while non-zero.
    Hold {
        /// Drop frame-valid on the first pixel of the last active line.
        exclude_boundary: bool,
    },
    /// Frame-valid is gated by an explicit window that closes at the
    /// horizontal sync start of the last active line and reopens at the sync
    /// start of the last blanking line.
    BlankingWindow {
        /// Pixels between the end of the front porch and the sync start.
        sync_delay: u16,
    },
}

/// Counter phase offsets and frame-valid shaping for one variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingProfile {
    /// Extra pixels added to the pixel counter reload value.
    pub reload_skew: u16,
    /// Extra lines added to the line counter reload value (0 or 1).
    pub line_lead: u16,
    /// Frame-valid pipeline depth.
    pub fv_stages: FvStages,
    /// Frame-end rule.
    pub frame_end: FrameEnd,
}

impl TimingProfile {
    /// The profile used by the 720p60 2-lane and 1080p30 cores.
    pub const HOLD: TimingProfile = TimingProfile {
        reload_skew: 0,
        line_lead: 1,
        fv_stages: FvStages::Single,
        frame_end: FrameEnd::Hold {
            exclude_boundary: false,
        },
    };

    /// The profile used by the 720p60 4-lane core.
    pub const HOLD_SKEWED: TimingProfile = TimingProfile {
        reload_skew: 5,
        line_lead: 0,
        fv_stages: FvStages::Double,
        frame_end: FrameEnd::Hold {
            exclude_boundary: true,
        },
    };

    /// The profile used by the 1080p60 cores: 3 cycles of sync pipeline plus
    /// 4 of alignment, less the one already in the reload formula.
    pub const WINDOWED: TimingProfile = TimingProfile {
        reload_skew: 6,
        line_lead: 0,
        fv_stages: FvStages::Double,
        frame_end: FrameEnd::BlankingWindow { sync_delay: 3 },
    };

    /// Returns the built-in profile for a variant.
    pub fn for_variant(variant: FormatVariant) -> Self {
        match (variant.format, variant.lanes) {
            (VideoFormat::Hd720p60, LaneCount::Two) => Self::HOLD,
            (VideoFormat::Hd720p60, LaneCount::Four) => Self::HOLD_SKEWED,
            (VideoFormat::Hd1080p30, _) => Self::HOLD,
            (VideoFormat::Hd1080p60, _) => Self::WINDOWED,
        }
    }

    /// Pixel counter value loaded on an `hsync` rising edge.
    pub fn reload_pixel(&self, timings: &VideoTimings) -> u16 {
        timings.h_active() + timings.h_front_porch() + self.reload_skew + 1
    }

    /// Line counter value loaded on a `vsync` rising edge.
    pub fn start_line(&self, timings: &VideoTimings) -> u16 {
        timings.v_active() + timings.v_front_porch() + self.line_lead
    }

    /// Checks that both reload values land inside the counters' ranges.
    pub fn validate(&self, timings: &VideoTimings) -> Result<(), FormatError> {
        let pixel = u32::from(timings.h_active())
            + u32::from(timings.h_front_porch())
            + u32::from(self.reload_skew)
            + 1;
        if pixel > u32::from(timings.h_total()) {
            return Err(FormatError::ReloadOutOfRange {
                name: "pixel",
                value: pixel,
                total: timings.h_total(),
            });
        }
        let line = u32::from(timings.v_active())
            + u32::from(timings.v_front_porch())
            + u32::from(self.line_lead);
        if line > u32::from(timings.v_total()) {
            return Err(FormatError::ReloadOutOfRange {
                name: "line",
                value: line,
                total: timings.v_total(),
            });
        }
        Ok(())
    }
}
