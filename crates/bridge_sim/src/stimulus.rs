//! Generated SDI-like input: sync pulses and a byte stream.
//!
//! Each line is laid out as `[sync][back porch][active][front porch]` and each
//! frame starts with its `V_SYNC` lines. An EAV preamble is inserted
//! `trs_offset` pixels into the front porch of every line. Fill bytes never
//! contain `0xFF`, so the preamble is the only place the detector can start.

use bridge_common::{VideoTimings, EAV_PREAMBLE};
use bridge_config::ResolvedCore;

/// Fill byte for blanking.
pub const BLANK_FILL: u8 = 0x10;

/// Span of the active-video ramp; `BLANK_FILL + RAMP_SPAN - 1` stays below `0xFF`.
const RAMP_SPAN: u16 = 0xE0;

/// One byte clock's worth of input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StimulusSample {
    /// Vertical sync.
    pub vsync: bool,
    /// Horizontal sync.
    pub hsync: bool,
    /// Stream byte.
    pub data: u8,
}

/// A free-running video source clocked by the byte clock.
#[derive(Clone, Debug)]
pub struct VideoSource {
    timings: VideoTimings,
    bytes_per_pixel: u16,
    active_start: u16,
    preamble_start: u32,
    line: u16,
    byte: u32,
}

impl VideoSource {
    /// Creates a source positioned at the first byte of the first sync line.
    pub fn new(timings: VideoTimings, bytes_per_pixel: u16, trs_offset: u16) -> Self {
        let active_start = timings.h_sync() + timings.h_back_porch();
        let preamble_pixel =
            u32::from(active_start) + u32::from(timings.h_active()) + u32::from(trs_offset);
        Self {
            timings,
            bytes_per_pixel: bytes_per_pixel.max(1),
            active_start,
            preamble_start: preamble_pixel * u32::from(bytes_per_pixel.max(1)),
            line: 0,
            byte: 0,
        }
    }

    /// Creates the source matching a resolved core.
    pub fn for_core(core: &ResolvedCore) -> Self {
        Self::new(core.timings, core.bytes_per_pixel(), core.stimulus.trs_offset)
    }

    /// Bytes in one line.
    pub fn line_bytes(&self) -> u32 {
        u32::from(self.timings.h_total()) * u32::from(self.bytes_per_pixel)
    }

    /// Current line number, 0 at the start of vertical sync.
    pub fn line(&self) -> u16 {
        self.line
    }

    /// Current pixel within the line.
    pub fn pixel(&self) -> u16 {
        // Bounded by `h_total`, which fits in u16.
        (self.byte / u32::from(self.bytes_per_pixel)) as u16
    }

    /// Byte offset of the first preamble byte within a line.
    pub fn preamble_start(&self) -> u32 {
        self.preamble_start
    }

    fn active_line(&self) -> bool {
        let first = self.timings.v_sync() + self.timings.v_back_porch();
        self.line >= first && self.line < first + self.timings.v_active()
    }

    /// The sample presented on the current byte clock cycle.
    pub fn current(&self) -> StimulusSample {
        let pixel = self.pixel();
        let vsync = self.line < self.timings.v_sync();
        let hsync = pixel < self.timings.h_sync();

        let data = match self.byte.checked_sub(self.preamble_start) {
            Some(i) if (i as usize) < EAV_PREAMBLE.len() => EAV_PREAMBLE[i as usize],
            _ => {
                let active_end = self.active_start + self.timings.h_active();
                if self.active_line() && pixel >= self.active_start && pixel < active_end {
                    // The ramp value is below RAMP_SPAN, which fits in u8.
                    BLANK_FILL + ((pixel - self.active_start) % RAMP_SPAN) as u8
                } else {
                    BLANK_FILL
                }
            }
        };

        StimulusSample { vsync, hsync, data }
    }

    /// Moves to the next byte.
    pub fn advance(&mut self) {
        self.byte += 1;
        if self.byte >= self.line_bytes() {
            self.byte = 0;
            self.line += 1;
            if self.line >= self.timings.v_total() {
                self.line = 0;
            }
        }
    }
}
