//! Top-level composition of the synchronization core.
//!
//! Wires the stimulus source, timing generator, preamble detector, bit
//! aligner, clock divider and reset sequencer together across the byte (sys),
//! pixel and housekeeping domains. Every cross-domain signal passes a
//! two-stage [`Synchronizer`]; every domain has its own [`ResetSynchronizer`].

use bridge_config::ResolvedCore;
use tracing::{debug, info};

use crate::aligner::BitAligner;
use crate::detector::{DetectorInputs, PreambleDetector, ScanState};
use crate::divider::ClockDivider;
use crate::error::SimError;
use crate::monitor::MonitorSample;
use crate::reset::ResetSequencer;
use crate::stimulus::{StimulusSample, VideoSource};
use crate::sync::{ResetSynchronizer, Synchronizer};
use crate::time::SimTime;
use crate::timing::{SyncInputs, TimingGenerator};

/// Boundary signals exposed for waveform recording, with their widths.
pub const PROBES: [(&str, u32); 11] = [
    ("rst_n", 1),
    ("heartbeat", 1),
    ("vsync_i", 1),
    ("hsync_i", 1),
    ("data_i", 8),
    ("pix_clk", 1),
    ("fv_o", 1),
    ("lv_o", 1),
    ("n_align", 1),
    ("detector_rst_o", 1),
    ("align_o", 1),
];

/// The detector, aligner and divider loop that recovers the byte phase.
///
/// Present only for formats whose pixel clock is divided from the byte clock.
#[derive(Clone, Debug)]
pub struct AlignmentLoop {
    detector: PreambleDetector,
    aligner: BitAligner,
    divider: ClockDivider,
    lv_sync: Synchronizer,
    det_rst_sync: Synchronizer,
    align_sync: Synchronizer,
    n_align_sync: Synchronizer,
}

impl AlignmentLoop {
    fn new(initial_level: bool) -> Self {
        Self {
            detector: PreambleDetector::new(),
            aligner: BitAligner::new(),
            divider: ClockDivider::new(initial_level),
            lv_sync: Synchronizer::default(),
            det_rst_sync: Synchronizer::default(),
            align_sync: Synchronizer::default(),
            n_align_sync: Synchronizer::default(),
        }
    }

    /// The detector.
    pub fn detector(&self) -> &PreambleDetector {
        &self.detector
    }

    /// The aligner.
    pub fn aligner(&self) -> &BitAligner {
        &self.aligner
    }

    /// The divider.
    pub fn divider(&self) -> &ClockDivider {
        &self.divider
    }

    /// One byte clock edge. Returns `true` when the divided clock rises.
    fn sys_edge(&mut self, data: u8, lv: bool, sys_reset: bool) -> bool {
        let detector = if sys_reset || self.det_rst_sync.output() {
            PreambleDetector::new()
        } else {
            self.detector.next(DetectorInputs {
                data,
                lv: self.lv_sync.output(),
                pixel_level: self.divider.level(),
            })
        };
        let divider = self.divider.next(self.align_sync.output(), sys_reset);
        let rose = self.divider.rises_to(&divider);

        self.detector = detector;
        self.divider = divider;
        self.lv_sync = self.lv_sync.next(lv);
        self.det_rst_sync = self.det_rst_sync.next(self.aligner.detector_rst());
        self.align_sync = self.align_sync.next(self.aligner.align_o());
        rose
    }

    /// One housekeeping clock edge. Returns `true` when a slip was issued.
    fn hk_edge(&mut self, hk_reset: bool) -> bool {
        let aligner = if hk_reset {
            BitAligner::new()
        } else {
            self.aligner.next(self.n_align_sync.output())
        };
        let slipped = !hk_reset && aligner.align_o() != self.aligner.align_o();

        self.aligner = aligner;
        self.n_align_sync = self.n_align_sync.next(self.detector.n_align());
        slipped
    }

    /// Asynchronous reset of the loop's state machines.
    fn assert_reset(&mut self) {
        self.detector = PreambleDetector::new();
        self.aligner = BitAligner::new();
        self.divider = ClockDivider::new(self.divider.level());
    }
}

/// The complete core with its stimulus.
#[derive(Clone, Debug)]
pub struct Bridge {
    source: VideoSource,
    timing: TimingGenerator,
    reset: ResetSequencer,
    sys_rst: ResetSynchronizer,
    hk_rst: ResetSynchronizer,
    pix_rst: ResetSynchronizer,
    align_loop: Option<AlignmentLoop>,
    button: bool,
    last_sample: StimulusSample,
    slips: u64,
    sys_cycles: u64,
    pix_cycles: u64,
    hk_cycles: u64,
}

impl Bridge {
    /// Builds the core for a resolved configuration, at power-up.
    pub fn new(core: &ResolvedCore) -> Result<Self, SimError> {
        let timing = TimingGenerator::new(&core.timings, &core.profile)?;
        let align_loop = core
            .uses_divider()
            .then(|| AlignmentLoop::new(core.stimulus.initial_phase != 0));
        Ok(Self {
            source: VideoSource::for_core(core),
            timing,
            reset: ResetSequencer::new(core.reset),
            sys_rst: ResetSynchronizer::default(),
            hk_rst: ResetSynchronizer::default(),
            pix_rst: ResetSynchronizer::default(),
            align_loop,
            button: false,
            last_sample: StimulusSample::default(),
            slips: 0,
            sys_cycles: 0,
            pix_cycles: 0,
            hk_cycles: 0,
        })
    }

    /// Drives the reset button input.
    pub fn set_button(&mut self, pressed: bool) {
        self.button = pressed;
    }

    /// One byte clock edge. Returns `true` when the pixel clock ticked too.
    pub fn sys_edge(&mut self) -> bool {
        self.sys_cycles += 1;
        let sample = self.source.current();
        self.last_sample = sample;
        let sys_reset = !self.sys_rst.released();
        let lv = self.timing.lv();

        let pix_tick = match self.align_loop.as_mut() {
            Some(lp) => {
                let was_aligned = lp.detector.aligned();
                let rose = lp.sys_edge(sample.data, lv, sys_reset);
                if !was_aligned && lp.detector.aligned() {
                    debug!(sys_cycle = self.sys_cycles, "detector aligned");
                }
                rose
            }
            None => true,
        };
        self.sys_rst = self.sys_rst.next(self.reset.rst_n());

        if pix_tick {
            self.pix_edge(sample);
        }
        self.source.advance();
        pix_tick
    }

    fn pix_edge(&mut self, sample: StimulusSample) {
        self.pix_cycles += 1;
        if self.pix_rst.released() {
            self.timing.tick(SyncInputs {
                vsync: sample.vsync,
                hsync: sample.hsync,
            });
        } else {
            self.timing.reset();
        }
        self.pix_rst = self.pix_rst.next(self.reset.rst_n());
    }

    /// One housekeeping clock edge.
    pub fn hk_edge(&mut self) {
        self.hk_cycles += 1;
        let was_released = self.reset.rst_n();
        let reset = self.reset.next(self.button);
        let hk_reset = !self.hk_rst.released();

        if let Some(lp) = self.align_loop.as_mut() {
            if lp.hk_edge(hk_reset) {
                self.slips += 1;
                debug!(
                    slips = self.slips,
                    retry = lp.aligner.count(),
                    "bit slip issued"
                );
            }
        }
        self.hk_rst = self.hk_rst.next(was_released);
        self.reset = reset;

        match (was_released, reset.rst_n()) {
            (false, true) => info!(hk_cycle = self.hk_cycles, "main reset released"),
            (true, false) => {
                info!(hk_cycle = self.hk_cycles, "main reset asserted");
                self.assert_reset();
            }
            _ => {}
        }
    }

    /// Asynchronously asserts reset in every domain.
    fn assert_reset(&mut self) {
        self.sys_rst.assert();
        self.hk_rst.assert();
        self.pix_rst.assert();
        self.timing.reset();
        if let Some(lp) = self.align_loop.as_mut() {
            lp.assert_reset();
        }
    }

    /// Frame-valid output.
    pub fn fv(&self) -> bool {
        self.timing.fv()
    }

    /// Line-valid output.
    pub fn lv(&self) -> bool {
        self.timing.lv()
    }

    /// The timing generator.
    pub fn timing(&self) -> &TimingGenerator {
        &self.timing
    }

    /// The alignment loop, when the format has one.
    pub fn alignment(&self) -> Option<&AlignmentLoop> {
        self.align_loop.as_ref()
    }

    /// Detector state; `None` without an alignment loop.
    pub fn detector_state(&self) -> Option<ScanState> {
        self.align_loop.as_ref().map(|lp| lp.detector.state())
    }

    /// Whether the byte phase is trusted. Always `true` without a divider.
    pub fn aligned(&self) -> bool {
        self.align_loop
            .as_ref()
            .is_none_or(|lp| lp.detector.aligned())
    }

    /// Slips issued since power-up.
    pub fn slips(&self) -> u64 {
        self.slips
    }

    /// Main reset released.
    pub fn rst_n(&self) -> bool {
        self.reset.rst_n()
    }

    /// Heartbeat output.
    pub fn heartbeat(&self) -> bool {
        self.reset.heartbeat()
    }

    /// Byte clock edges so far.
    pub fn sys_cycles(&self) -> u64 {
        self.sys_cycles
    }

    /// Pixel clock edges so far.
    pub fn pix_cycles(&self) -> u64 {
        self.pix_cycles
    }

    /// Housekeeping clock edges so far.
    pub fn hk_cycles(&self) -> u64 {
        self.hk_cycles
    }

    /// The pixel-domain sample for the frame monitor.
    pub fn monitor_sample(&self, time: SimTime) -> MonitorSample {
        MonitorSample {
            time,
            fv: self.timing.fv(),
            lv: self.timing.lv(),
            vsync_edge: self.timing.vsync_edge(),
            slips: self.slips,
            aligned: self.aligned(),
        }
    }

    /// Current values of [`PROBES`], in order. `pix_clk` stays low when the
    /// pixel clock is not divided.
    pub fn probe_values(&self) -> [u64; PROBES.len()] {
        let lp = self.align_loop.as_ref();
        let bit = |b: bool| u64::from(b);
        [
            bit(self.reset.rst_n()),
            bit(self.reset.heartbeat()),
            bit(self.last_sample.vsync),
            bit(self.last_sample.hsync),
            u64::from(self.last_sample.data),
            bit(lp.is_some_and(|l| l.divider.level())),
            bit(self.timing.fv()),
            bit(self.timing.lv()),
            bit(lp.is_some_and(|l| l.detector.n_align())),
            bit(lp.is_some_and(|l| l.aligner.detector_rst())),
            bit(lp.is_some_and(|l| l.aligner.align_o())),
        ]
    }
}
