//! Horizontal/vertical timing tables for the supported video formats.

use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::format::VideoFormat;

/// Largest value the 12-bit pixel and line counters can hold.
pub const COUNTER_MAX: u16 = 4095;

/// An immutable video timing table.
///
/// Totals are derived, never stored independently, so `H_TOTAL` always equals
/// `H_ACTIVE + H_SYNC + H_BACK_PORCH + H_FRONT_PORCH` (and likewise vertically).
/// Construct via [`VideoTimings::new`], which validates every parameter, or
/// [`VideoTimings::for_format`] for the built-in tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoTimings {
    h_active: u16,
    h_sync: u16,
    h_back_porch: u16,
    h_front_porch: u16,
    v_active: u16,
    v_sync: u16,
    v_back_porch: u16,
    v_front_porch: u16,
}

impl VideoTimings {
    /// Builds a validated timing table.
    ///
    /// Arguments are in table order: horizontal active, front porch, sync, back
    /// porch, then the same four vertically. Every parameter must be positive and
    /// both totals must fit the 12-bit counters.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        h_active: u16,
        h_front_porch: u16,
        h_sync: u16,
        h_back_porch: u16,
        v_active: u16,
        v_front_porch: u16,
        v_sync: u16,
        v_back_porch: u16,
    ) -> Result<Self, FormatError> {
        let named = [
            ("H_ACTIVE", h_active),
            ("H_FRONT_PORCH", h_front_porch),
            ("H_SYNC", h_sync),
            ("H_BACK_PORCH", h_back_porch),
            ("V_ACTIVE", v_active),
            ("V_FRONT_PORCH", v_front_porch),
            ("V_SYNC", v_sync),
            ("V_BACK_PORCH", v_back_porch),
        ];
        if let Some((name, _)) = named.iter().find(|(_, v)| *v == 0) {
            return Err(FormatError::ZeroParameter(name));
        }

        let h_total =
            u32::from(h_active) + u32::from(h_front_porch) + u32::from(h_sync) + u32::from(h_back_porch);
        let v_total =
            u32::from(v_active) + u32::from(v_front_porch) + u32::from(v_sync) + u32::from(v_back_porch);
        for (name, value) in [("H_TOTAL", h_total), ("V_TOTAL", v_total)] {
            if value > u32::from(COUNTER_MAX) {
                return Err(FormatError::CounterOverflow {
                    name,
                    value,
                    max: COUNTER_MAX,
                });
            }
        }

        Ok(Self {
            h_active,
            h_sync,
            h_back_porch,
            h_front_porch,
            v_active,
            v_sync,
            v_back_porch,
            v_front_porch,
        })
    }

    /// Returns the built-in timing table for a supported format.
    pub fn for_format(format: VideoFormat) -> Self {
        match format {
            VideoFormat::Hd720p60 => Self {
                h_active: 1280,
                h_front_porch: 110,
                h_sync: 40,
                h_back_porch: 220,
                v_active: 720,
                v_front_porch: 5,
                v_sync: 5,
                v_back_porch: 20,
            },
            VideoFormat::Hd1080p30 | VideoFormat::Hd1080p60 => Self {
                h_active: 1920,
                h_front_porch: 88,
                h_sync: 44,
                h_back_porch: 148,
                v_active: 1080,
                v_front_porch: 4,
                v_sync: 5,
                v_back_porch: 36,
            },
        }
    }

    /// Active pixels per line.
    pub fn h_active(&self) -> u16 {
        self.h_active
    }

    /// Horizontal sync width in pixels.
    pub fn h_sync(&self) -> u16 {
        self.h_sync
    }

    /// Horizontal back porch in pixels.
    pub fn h_back_porch(&self) -> u16 {
        self.h_back_porch
    }

    /// Horizontal front porch in pixels.
    pub fn h_front_porch(&self) -> u16 {
        self.h_front_porch
    }

    /// Active lines per frame.
    pub fn v_active(&self) -> u16 {
        self.v_active
    }

    /// Vertical sync width in lines.
    pub fn v_sync(&self) -> u16 {
        self.v_sync
    }

    /// Vertical back porch in lines.
    pub fn v_back_porch(&self) -> u16 {
        self.v_back_porch
    }

    /// Vertical front porch in lines.
    pub fn v_front_porch(&self) -> u16 {
        self.v_front_porch
    }

    /// Total pixels per line, including blanking.
    pub fn h_total(&self) -> u16 {
        self.h_active + self.h_front_porch + self.h_sync + self.h_back_porch
    }

    /// Total lines per frame, including blanking.
    pub fn v_total(&self) -> u16 {
        self.v_active + self.v_front_porch + self.v_sync + self.v_back_porch
    }

    /// Horizontal blanking width in pixels.
    pub fn h_blanking(&self) -> u16 {
        self.h_total() - self.h_active
    }

    /// Pixel clock cycles per frame.
    pub fn frame_cycles(&self) -> u64 {
        u64::from(self.h_total()) * u64::from(self.v_total())
    }
}
