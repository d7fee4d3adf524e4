//! Core resolution: turning a validated configuration into concrete parameters.

use crate::error::ConfigError;
use crate::loader::validate_config;
use crate::types::BridgeConfig;
use bridge_common::{FormatVariant, Frequency, TimingProfile, VideoTimings, EAV_PREAMBLE};
use std::path::PathBuf;

/// Largest accepted `stimulus.initial_phase`.
pub(crate) const MAX_INITIAL_PHASE: u8 = 1;

/// Smallest accepted `stimulus.trs_offset`, in pixels.
///
/// `lv_o` falls three pixel clocks after the last active pixel (sync edge
/// detect, `lv_r`, `lv_o`) and the detector sees it low through `lv_sync`
/// from the fifth pixel on, in either divider phase. One pixel of margin is
/// added. A preamble starting earlier is cut short by the detector's
/// line-valid restart.
pub const MIN_TRS_OFFSET: u16 = 6;

/// Reset sequencing policy for the housekeeping domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetPolicy {
    /// Housekeeping ticks the main reset is held after power-up.
    pub hold_ticks: u32,
    /// Housekeeping ticks per heartbeat toggle.
    pub heartbeat_ticks: u32,
    /// Release on the first heartbeat toggle instead of after `hold_ticks`.
    pub release_on_heartbeat: bool,
    /// Whether the reset button input is honored.
    pub button: bool,
}

/// Stimulus generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusSettings {
    /// Pixels after active video at which the EAV preamble starts.
    pub trs_offset: u16,
    /// Clock divider phase at power-up.
    pub initial_phase: u8,
}

/// A fully resolved core: everything the simulator needs, with all strings
/// parsed and all defaults applied.
#[derive(Debug, Clone)]
pub struct ResolvedCore {
    /// The format/lane variant.
    pub variant: FormatVariant,
    /// The variant's timing table.
    pub timings: VideoTimings,
    /// The variant's timing-generator profile.
    pub profile: TimingProfile,
    /// Byte clock frequency.
    pub sys_clock: Frequency,
    /// Housekeeping clock frequency.
    pub housekeeping_clock: Frequency,
    /// Reset sequencing policy.
    pub reset: ResetPolicy,
    /// Stimulus settings.
    pub stimulus: StimulusSettings,
    /// Frames to simulate.
    pub frames: u32,
    /// Waveform output path, if any.
    pub waveform: Option<PathBuf>,
}

impl ResolvedCore {
    /// Resolves the default configuration for a variant.
    pub fn for_variant(variant: FormatVariant) -> Result<Self, ConfigError> {
        let mut config = BridgeConfig::default();
        config.core.format = variant.format.as_str().to_string();
        config.core.lanes = variant.lanes.count();
        resolve_core(&config)
    }

    /// Whether the pixel clock is derived from the byte clock by the divider.
    pub fn uses_divider(&self) -> bool {
        self.variant.format.uses_divider()
    }

    /// Bytes carried per pixel clock cycle.
    pub fn bytes_per_pixel(&self) -> u16 {
        if self.uses_divider() {
            2
        } else {
            1
        }
    }

    /// The effective pixel clock: the byte clock divided by bytes per pixel.
    pub fn pixel_clock(&self) -> Frequency {
        Frequency::from_hz(self.sys_clock.hz() / u64::from(self.bytes_per_pixel()))
            .unwrap_or(self.sys_clock)
    }
}

/// Parses a clock frequency field.
pub(crate) fn parse_clock(field: &'static str, value: &str) -> Result<Frequency, ConfigError> {
    value
        .parse()
        .map_err(|source| ConfigError::InvalidFrequency { field, source })
}

/// Resolves a configuration into a [`ResolvedCore`].
///
/// Validates the configuration first, then checks the constraints that depend
/// on the chosen variant. The EAV preamble must start after `lv_o` has settled
/// low and end inside the horizontal front porch. The housekeeping clock must
/// be slower than the byte clock, and its period must exceed one video line
/// so that a retry observes at least one preamble.
pub fn resolve_core(config: &BridgeConfig) -> Result<ResolvedCore, ConfigError> {
    validate_config(config)?;

    let variant = FormatVariant::parse(&config.core.format, config.core.lanes)?;
    let timings = variant.timings();
    let profile = variant.profile();
    profile.validate(&timings)?;

    let bytes_per_pixel: u64 = if variant.format.uses_divider() { 2 } else { 1 };
    let sys_clock = match &config.clocks.sys {
        Some(sys) => parse_clock("sys", sys)?,
        None => variant.format.pixel_clock().scaled(bytes_per_pixel),
    };
    let housekeeping_clock = parse_clock("housekeeping", &config.clocks.housekeeping)?;
    if housekeeping_clock >= sys_clock {
        return Err(ConfigError::ValidationError(format!(
            "housekeeping clock {housekeeping_clock} must be slower than sys clock {sys_clock}"
        )));
    }

    // Bytes per second needed to fit a whole line into one housekeeping period.
    let line_byte_rate = u128::from(housekeeping_clock.hz())
        * u128::from(timings.h_total())
        * u128::from(bytes_per_pixel);
    if line_byte_rate >= u128::from(sys_clock.hz()) {
        return Err(ConfigError::ValidationError(format!(
            "housekeeping clock {housekeeping_clock} is too fast: one period must exceed \
             one {}-pixel line",
            timings.h_total()
        )));
    }

    if config.stimulus.trs_offset < MIN_TRS_OFFSET {
        return Err(ConfigError::ValidationError(format!(
            "stimulus.trs_offset {} starts the preamble before line-valid falls \
             (minimum {MIN_TRS_OFFSET})",
            config.stimulus.trs_offset
        )));
    }
    let preamble_pixels = EAV_PREAMBLE.len() as u64 / bytes_per_pixel;
    let trs_end = u64::from(config.stimulus.trs_offset) + preamble_pixels;
    if trs_end > u64::from(timings.h_front_porch()) {
        return Err(ConfigError::ValidationError(format!(
            "stimulus.trs_offset {} places the preamble past the {}-pixel front porch",
            config.stimulus.trs_offset,
            timings.h_front_porch()
        )));
    }

    Ok(ResolvedCore {
        variant,
        timings,
        profile,
        sys_clock,
        housekeeping_clock,
        reset: ResetPolicy {
            hold_ticks: config.reset.hold_ticks,
            heartbeat_ticks: config.reset.heartbeat_ticks,
            release_on_heartbeat: config.reset.release_on_heartbeat,
            button: config.reset.button,
        },
        stimulus: StimulusSettings {
            trs_offset: config.stimulus.trs_offset,
            initial_phase: config.stimulus.initial_phase,
        },
        frames: config.sim.frames,
        waveform: config.sim.waveform.as_ref().map(PathBuf::from),
    })
}
