//! Simulation kernel: clock scheduling, frame monitoring and waveform output.

use std::path::Path;

use bridge_common::FormatVariant;
use bridge_config::ResolvedCore;
use serde::Serialize;
use tracing::{debug, trace};

use crate::clock::{ClockScheduler, Domain};
use crate::error::SimError;
use crate::monitor::{ExpectedFrame, FrameMonitor, FrameReport};
use crate::time::SimTime;
use crate::top::{Bridge, PROBES};
use crate::waveform::{VcdRecorder, WaveformFile, WaveformRecorder};

/// The result of a completed simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimResult {
    /// The simulated variant.
    pub variant: FormatVariant,
    /// Time of the last processed clock edge.
    pub final_time: SimTime,
    /// Byte clock edges.
    pub sys_cycles: u64,
    /// Pixel clock edges.
    pub pix_cycles: u64,
    /// Housekeeping clock edges.
    pub hk_cycles: u64,
    /// Whether the main reset was released by the end of the run.
    pub reset_released: bool,
    /// Detector alignment at the end of the run.
    pub aligned: bool,
    /// Slips issued during the run.
    pub slips: u64,
    /// The window every frame should trace.
    pub expected: ExpectedFrame,
    /// Reports of every complete frame.
    pub frames: Vec<FrameReport>,
}

impl SimResult {
    /// Frames that differ from the expected window, with their problems.
    pub fn mismatches(&self) -> Vec<(u32, Vec<String>)> {
        self.frames
            .iter()
            .map(|f| (f.index, self.expected.mismatches(f)))
            .filter(|(_, problems)| !problems.is_empty())
            .collect()
    }

    /// `true` when every reported frame matches the expected window.
    pub fn is_clean(&self) -> bool {
        self.mismatches().is_empty()
    }
}

/// Runs a [`Bridge`] against its clocks.
///
/// Construct with [`SimKernel::new`], optionally attach a waveform file, then
/// [`run`](SimKernel::run) and [`finish`](SimKernel::finish).
pub struct SimKernel {
    variant: FormatVariant,
    bridge: Bridge,
    scheduler: ClockScheduler,
    monitor: FrameMonitor,
    recorder: Option<VcdRecorder<WaveformFile>>,
    expected: ExpectedFrame,
    frames: Vec<FrameReport>,
    now: SimTime,
}

impl SimKernel {
    /// Builds a kernel at power-up for a resolved core.
    pub fn new(core: &ResolvedCore) -> Result<Self, SimError> {
        let bridge = Bridge::new(core)?;
        let mut scheduler = ClockScheduler::new();
        scheduler.add_clock(Domain::Sys, core.sys_clock);
        scheduler.add_clock(Domain::Housekeeping, core.housekeeping_clock);
        Ok(Self {
            variant: core.variant,
            bridge,
            scheduler,
            monitor: FrameMonitor::new(),
            recorder: None,
            expected: ExpectedFrame::for_core(&core.timings, &core.profile),
            frames: Vec::new(),
            now: SimTime::ZERO,
        })
    }

    /// Records every probe into a VCD file at `path`.
    pub fn attach_waveform(&mut self, path: &Path) -> Result<(), SimError> {
        let mut recorder = VcdRecorder::new(WaveformFile::create(path)?);
        recorder.begin_scope("bridge")?;
        for (name, width) in PROBES {
            recorder.register_signal(name, width)?;
        }
        recorder.end_scope()?;
        self.recorder = Some(recorder);
        Ok(())
    }

    /// The simulated core.
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Mutable access to the core, for driving its inputs.
    pub fn bridge_mut(&mut self) -> &mut Bridge {
        &mut self.bridge
    }

    /// Time of the last processed edge.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Frames reported so far.
    pub fn frames(&self) -> &[FrameReport] {
        &self.frames
    }

    /// Processes the next clock edge. Returns the frame it completed, if any.
    pub fn step(&mut self) -> Result<Option<FrameReport>, SimError> {
        let Some(edge) = self.scheduler.next_edge() else {
            return Ok(None);
        };
        self.now = edge.time;

        let mut report = None;
        match edge.domain {
            Domain::Sys => {
                if self.bridge.sys_edge() {
                    report = self.monitor.observe(self.bridge.monitor_sample(edge.time));
                }
            }
            Domain::Housekeeping => {
                self.bridge.hk_edge();
                trace!(time = %edge.time, heartbeat = self.bridge.heartbeat(), "hk edge");
            }
        }

        if let Some(recorder) = self.recorder.as_mut() {
            for (&(name, _), value) in PROBES.iter().zip(self.bridge.probe_values()) {
                recorder.record_change(edge.time, name, value)?;
            }
        }

        if let Some(frame) = &report {
            debug!(
                index = frame.index,
                start = %frame.start,
                period = frame.period_cycles,
                slips = frame.slips,
                aligned = frame.aligned,
                "frame complete"
            );
            self.frames.push(frame.clone());
        }
        Ok(report)
    }

    /// Steps until `frames` frames are reported or the next edge lies past
    /// `time_limit`, whichever comes first.
    pub fn run(
        &mut self,
        frames: Option<u32>,
        time_limit: Option<SimTime>,
    ) -> Result<(), SimError> {
        if frames.is_none() && time_limit.is_none() {
            return Err(SimError::NoStopCondition);
        }
        loop {
            if let Some(target) = frames {
                if self.frames.len() >= target as usize {
                    break;
                }
            }
            match (self.scheduler.peek(), time_limit) {
                (None, _) => break,
                (Some(edge), Some(limit)) if edge.time > limit => break,
                _ => {}
            }
            self.step()?;
        }
        Ok(())
    }

    /// Closes the waveform file and returns the run's results.
    pub fn finish(self) -> Result<SimResult, SimError> {
        if let Some(mut recorder) = self.recorder {
            recorder.finalize()?;
            recorder.into_inner().finish()?;
        }
        Ok(SimResult {
            variant: self.variant,
            final_time: self.now,
            sys_cycles: self.bridge.sys_cycles(),
            pix_cycles: self.bridge.pix_cycles(),
            hk_cycles: self.bridge.hk_cycles(),
            reset_released: self.bridge.rst_n(),
            aligned: self.bridge.aligned(),
            slips: self.bridge.slips(),
            expected: self.expected,
            frames: self.frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_common::{LaneCount, VideoFormat};

    fn kernel() -> SimKernel {
        let core = ResolvedCore::for_variant(FormatVariant::new(
            VideoFormat::Hd720p60,
            LaneCount::Two,
        ))
        .unwrap();
        SimKernel::new(&core).unwrap()
    }

    #[test]
    fn run_requires_stop_condition() {
        let mut k = kernel();
        assert!(matches!(k.run(None, None), Err(SimError::NoStopCondition)));
    }

    #[test]
    fn time_limit_stops_run() {
        let mut k = kernel();
        k.run(None, Some(SimTime::from_us(1))).unwrap();
        assert!(k.now() <= SimTime::from_us(1));
        let result = k.finish().unwrap();
        // 148.5 MHz for 1 us.
        assert_eq!(result.sys_cycles, 148);
        assert_eq!(result.hk_cycles, 0);
        assert!(!result.reset_released);
        assert!(result.frames.is_empty());
        assert!(result.is_clean());
    }

    #[test]
    fn housekeeping_edges_interleave() {
        let mut k = kernel();
        k.run(None, Some(SimTime::from_us(250))).unwrap();
        let result = k.finish().unwrap();
        assert_eq!(result.hk_cycles, 2);
        assert!(result.sys_cycles > 37_000);
    }

    #[test]
    fn mismatches_reported_per_frame() {
        let k = kernel();
        let mut result = k.finish().unwrap();
        let mut bad = FrameReport {
            index: 3,
            ..FrameReport::default()
        };
        bad.period_cycles = 1;
        result.frames.push(bad);
        let mismatches = result.mismatches();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].0, 3);
        assert!(!result.is_clean());
    }

    #[test]
    fn waveform_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.vcd");
        let mut k = kernel();
        k.attach_waveform(&path).unwrap();
        k.run(None, Some(SimTime::from_ns(100))).unwrap();
        k.finish().unwrap();
        let vcd = std::fs::read_to_string(&path).unwrap();
        assert!(vcd.contains("$scope module bridge $end"));
        assert!(vcd.contains("data_i $end"));
        assert!(vcd.contains("$dumpvars"));
    }
}
