//! Cycle-stepped simulator for the SDI bridge synchronization core.
//!
//! The core recovers frame-valid/line-valid timing from a deserialized SDI
//! stream and keeps its divided pixel clock byte-aligned to the stream by
//! searching for EAV preambles and slipping the clock divider until the
//! preamble lands on the expected phase.
//!
//! # Architecture
//!
//! Each component is a register set with a pure `next` function computed from
//! pre-tick values. The [`kernel`] advances a multi-domain
//! [`ClockScheduler`](clock::ClockScheduler) edge by edge; the byte (sys) and
//! housekeeping clocks are scheduled, the pixel clock is produced by the
//! divider inside the sys domain. A [`FrameMonitor`] turns the pixel-domain
//! outputs into per-frame reports.
//!
//! # Usage
//!
//! ```ignore
//! use bridge_sim::{simulate, SimConfig};
//!
//! let config = SimConfig::from_core(&core);
//! let result = simulate(&core, &config)?;
//! println!("{} frames, aligned = {}", result.frames.len(), result.aligned);
//! ```
//!
//! # Modules
//!
//! - `time`: Femtosecond simulation time
//! - `clock`: Multi-domain clock scheduler
//! - `sync`: Synchronizers and the stable-window flag combinator
//! - `timing`: Timing generator (FV/LV)
//! - `detector`: EAV preamble detector
//! - `aligner`: Bit aligner retry loop
//! - `divider`: Clock divider with bit slip
//! - `reset`: Reset sequencer and heartbeat
//! - `stimulus`: Generated sync and byte stream
//! - `top`: Composition of the core
//! - `monitor`: Frame reports and expected windows
//! - `waveform`: VCD recording
//! - `kernel`: Simulation kernel

#![warn(missing_docs)]

pub mod aligner;
pub mod clock;
pub mod detector;
pub mod divider;
pub mod error;
pub mod kernel;
pub mod monitor;
pub mod reset;
pub mod stimulus;
pub mod sync;
pub mod time;
pub mod timing;
pub mod top;
pub mod waveform;

use std::path::PathBuf;

use bridge_config::ResolvedCore;
use tracing::info;

pub use error::SimError;
pub use kernel::{SimKernel, SimResult};
pub use monitor::{ExpectedFrame, FrameMonitor, FrameReport};
pub use time::SimTime;
pub use top::Bridge;
pub use waveform::{VcdRecorder, WaveformRecorder};

/// Configuration for a simulation run.
///
/// The run stops at whichever limit is reached first; at least one must be set.
#[derive(Debug, Clone, Default)]
pub struct SimConfig {
    /// Stop after this many complete frames.
    pub frames: Option<u32>,
    /// Stop before the first clock edge past this time.
    pub time_limit: Option<SimTime>,
    /// Optional path for waveform output.
    pub waveform_path: Option<PathBuf>,
    /// Whether to record waveform data. Ignored if `waveform_path` is `None`.
    pub record_waveform: bool,
}

impl SimConfig {
    /// The run described by a resolved core's `[sim]` settings.
    pub fn from_core(core: &ResolvedCore) -> Self {
        Self {
            frames: Some(core.frames),
            time_limit: None,
            waveform_path: core.waveform.clone(),
            record_waveform: core.waveform.is_some(),
        }
    }
}

/// High-level entry point: simulates a resolved core against its generated
/// stimulus until the configured stop condition.
pub fn simulate(core: &ResolvedCore, config: &SimConfig) -> Result<SimResult, SimError> {
    if config.frames.is_none() && config.time_limit.is_none() {
        return Err(SimError::NoStopCondition);
    }

    let mut kernel = SimKernel::new(core)?;
    if config.record_waveform {
        if let Some(path) = &config.waveform_path {
            kernel.attach_waveform(path)?;
        }
    }

    info!(
        variant = %core.variant,
        sys_clock = %core.sys_clock,
        housekeeping_clock = %core.housekeeping_clock,
        frames = ?config.frames,
        "starting simulation"
    );
    kernel.run(config.frames, config.time_limit)?;
    let result = kernel.finish()?;
    info!(
        final_time = %result.final_time,
        frames = result.frames.len(),
        aligned = result.aligned,
        slips = result.slips,
        "simulation finished"
    );
    Ok(result)
}
