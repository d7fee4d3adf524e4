//! The timing generator: frame-valid and line-valid from sync pulses.
//!
//! Runs on the pixel clock. `vsync`/`hsync` are double-registered and their
//! rising edges reload a pixel counter and a line counter; between edges the
//! counters free-run, so loss of sync is never detected. `lv_o` and `fv_o` are
//! derived from the counters with a fixed register latency.

use bridge_common::{FormatError, FrameEnd, FvStages, TimingProfile, VideoTimings};

use crate::sync::Synchronizer;

/// Width-limited maximum of the frame-end hold counter (10 bits).
pub const HOLD_MAX: u16 = 1023;

/// Sync inputs sampled on one pixel clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncInputs {
    /// Vertical sync.
    pub vsync: bool,
    /// Horizontal sync.
    pub hsync: bool,
}

/// All registers of the timing generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimingState {
    vsync: Synchronizer,
    hsync: Synchronizer,
    pixcnt: u16,
    linecnt: u16,
    hold: u16,
    fv_r: bool,
    fv_o: bool,
    lv_r: bool,
    lv_o: bool,
}

/// Counter-based FV/LV generator parameterized by a timing table and profile.
#[derive(Clone, Debug)]
pub struct TimingGenerator {
    h_active: u16,
    h_total: u16,
    v_active: u16,
    v_total: u16,
    reload_pixel: u16,
    start_line: u16,
    h_sync_start: u16,
    fv_stages: FvStages,
    frame_end: FrameEnd,
    state: TimingState,
}

impl TimingGenerator {
    /// Builds a generator in its reset state.
    ///
    /// Fails if the profile's reload values fall outside the counters' ranges.
    pub fn new(timings: &VideoTimings, profile: &TimingProfile) -> Result<Self, FormatError> {
        profile.validate(timings)?;
        let h_sync_start = match profile.frame_end {
            FrameEnd::BlankingWindow { sync_delay } => {
                timings.h_active() + timings.h_front_porch() + sync_delay
            }
            FrameEnd::Hold { .. } => 0,
        };
        Ok(Self {
            h_active: timings.h_active(),
            h_total: timings.h_total(),
            v_active: timings.v_active(),
            v_total: timings.v_total(),
            reload_pixel: profile.reload_pixel(timings),
            start_line: profile.start_line(timings),
            h_sync_start,
            fv_stages: profile.fv_stages,
            frame_end: profile.frame_end,
            state: TimingState::default(),
        })
    }

    /// Registered frame-valid output.
    pub fn fv(&self) -> bool {
        self.state.fv_o
    }

    /// Registered line-valid output.
    pub fn lv(&self) -> bool {
        self.state.lv_o
    }

    /// Current pixel counter.
    pub fn pixcnt(&self) -> u16 {
        self.state.pixcnt
    }

    /// Current line counter.
    pub fn linecnt(&self) -> u16 {
        self.state.linecnt
    }

    /// Current frame-end hold counter.
    pub fn hold_count(&self) -> u16 {
        self.state.hold
    }

    /// A `vsync` rising edge has been registered and reloads the line
    /// counter on the next clock.
    pub fn vsync_edge(&self) -> bool {
        self.state.vsync.rising()
    }

    /// A `hsync` rising edge has been registered and reloads the pixel
    /// counter on the next clock.
    pub fn hsync_edge(&self) -> bool {
        self.state.hsync.rising()
    }

    /// The combinational line-valid term.
    fn line_valid(&self) -> bool {
        self.state.pixcnt > 0 && self.state.pixcnt <= self.h_active
    }

    /// The combinational frame-valid term, shaped by the frame-end rule.
    fn frame_valid(&self) -> bool {
        let TimingState {
            pixcnt: pc,
            linecnt: lc,
            hold,
            ..
        } = self.state;
        let in_active = lc >= 1 && lc <= self.v_active;
        match self.frame_end {
            FrameEnd::Hold { exclude_boundary } => {
                let boundary = exclude_boundary && lc == self.v_active && pc == 1;
                (in_active && !boundary) || hold > 0
            }
            FrameEnd::BlankingWindow { .. } => {
                let past_sync = pc > self.h_sync_start || pc == 1;
                let closing = lc == self.v_active && past_sync;
                let opening = lc == self.v_total && past_sync;
                (in_active && !closing) || opening
            }
        }
    }

    /// Computes the registers after one pixel clock edge from the current
    /// state. Nothing is modified; apply the result with [`commit`](Self::commit).
    pub fn next_state(&self, inputs: SyncInputs) -> TimingState {
        let s = &self.state;

        let pixcnt = if s.hsync.rising() {
            self.reload_pixel
        } else if s.pixcnt < self.h_total {
            s.pixcnt + 1
        } else {
            1
        };

        let linecnt = if s.vsync.rising() {
            self.start_line
        } else if s.pixcnt == 1 {
            if s.linecnt < self.v_total {
                s.linecnt + 1
            } else {
                1
            }
        } else {
            s.linecnt
        };

        let hold = if s.linecnt == self.v_total && s.pixcnt >= self.h_active {
            (s.hold + 1).min(HOLD_MAX)
        } else {
            0
        };

        let fv_c = self.frame_valid();
        let fv_o = match self.fv_stages {
            FvStages::Single => fv_c,
            FvStages::Double => s.fv_r,
        };

        TimingState {
            vsync: s.vsync.next(inputs.vsync),
            hsync: s.hsync.next(inputs.hsync),
            pixcnt,
            linecnt,
            hold,
            fv_r: fv_c,
            fv_o,
            lv_r: self.line_valid(),
            lv_o: s.lv_r && s.fv_r,
        }
    }

    /// Applies a state computed by [`next_state`](Self::next_state).
    pub fn commit(&mut self, state: TimingState) {
        self.state = state;
    }

    /// Clocks the generator once.
    pub fn tick(&mut self, inputs: SyncInputs) {
        let next = self.next_state(inputs);
        self.commit(next);
    }

    /// Returns every register to zero.
    pub fn reset(&mut self) {
        self.state = TimingState::default();
    }
}
