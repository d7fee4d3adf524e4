//! Configuration types deserialized from `bridge.toml`.

use serde::Deserialize;

/// The top-level configuration parsed from `bridge.toml`.
///
/// Every table is optional; an empty file describes a 720p60 2-lane core with
/// default clocks, reset policy and stimulus.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Format and lane selection.
    #[serde(default)]
    pub core: CoreConfig,
    /// Clock frequencies.
    #[serde(default)]
    pub clocks: ClockConfig,
    /// Reset sequencing policy.
    #[serde(default)]
    pub reset: ResetConfig,
    /// Generated stimulus settings.
    #[serde(default)]
    pub stimulus: StimulusConfig,
    /// Simulation run settings.
    #[serde(default)]
    pub sim: SimSettings,
}

/// The `[core]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    /// Video format name (`720p60`, `1080p30`, `1080p60`).
    #[serde(default = "default_format")]
    pub format: String,
    /// Number of output lanes (2 or 4).
    #[serde(default = "default_lanes")]
    pub lanes: u8,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            lanes: default_lanes(),
        }
    }
}

fn default_format() -> String {
    "720p60".to_string()
}

fn default_lanes() -> u8 {
    2
}

/// The `[clocks]` table. Frequencies are strings such as `"148.5MHz"`, parsed
/// to [`Frequency`](bridge_common::Frequency) during resolution.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClockConfig {
    /// Byte clock. Defaults to twice the pixel clock when the format uses the
    /// clock divider, otherwise to the pixel clock.
    #[serde(default)]
    pub sys: Option<String>,
    /// Housekeeping clock driving the reset sequencer and the bit aligner.
    #[serde(default = "default_housekeeping")]
    pub housekeeping: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            sys: None,
            housekeeping: default_housekeeping(),
        }
    }
}

fn default_housekeeping() -> String {
    "10KHz".to_string()
}

/// The `[reset]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResetConfig {
    /// Housekeeping ticks the main reset is held after power-up.
    #[serde(default = "default_hold_ticks")]
    pub hold_ticks: u32,
    /// Housekeeping ticks per heartbeat toggle.
    #[serde(default = "default_heartbeat_ticks")]
    pub heartbeat_ticks: u32,
    /// Release the main reset on the first heartbeat toggle instead of after
    /// `hold_ticks`.
    #[serde(default)]
    pub release_on_heartbeat: bool,
    /// Whether an external reset button is wired; pressing it re-arms the hold.
    #[serde(default)]
    pub button: bool,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            hold_ticks: default_hold_ticks(),
            heartbeat_ticks: default_heartbeat_ticks(),
            release_on_heartbeat: false,
            button: false,
        }
    }
}

fn default_hold_ticks() -> u32 {
    8
}

fn default_heartbeat_ticks() -> u32 {
    5_000
}

/// The `[stimulus]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StimulusConfig {
    /// Pixels after the end of active video at which the EAV preamble starts.
    #[serde(default = "default_trs_offset")]
    pub trs_offset: u16,
    /// Clock divider phase at power-up (0 or 1).
    #[serde(default)]
    pub initial_phase: u8,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            trs_offset: default_trs_offset(),
            initial_phase: 0,
        }
    }
}

fn default_trs_offset() -> u16 {
    8
}

/// The `[sim]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SimSettings {
    /// Number of complete frames to simulate after reset release.
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Waveform output path. A `.gz` extension produces a compressed dump.
    #[serde(default)]
    pub waveform: Option<String>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            waveform: None,
        }
    }
}

fn default_frames() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: BridgeConfig = toml::from_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.core.format, "720p60");
        assert_eq!(config.core.lanes, 2);
        assert_eq!(config.clocks.housekeeping, "10KHz");
        assert_eq!(config.reset.hold_ticks, 8);
        assert_eq!(config.reset.heartbeat_ticks, 5_000);
        assert_eq!(config.stimulus.trs_offset, 8);
        assert_eq!(config.sim.frames, 2);
    }

    #[test]
    fn partial_tables_fill_defaults() {
        let config: BridgeConfig = toml::from_str(
            r#"
[core]
lanes = 4

[reset]
button = true
"#,
        )
        .unwrap();
        assert_eq!(config.core.format, "720p60");
        assert_eq!(config.core.lanes, 4);
        assert!(config.reset.button);
        assert!(!config.reset.release_on_heartbeat);
        assert_eq!(config.reset.hold_ticks, 8);
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<BridgeConfig, _> = toml::from_str(
            r#"
[core]
format = "720p60"
colour = "red"
"#,
        );
        assert!(result.is_err());
    }
}
