//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::{parse_clock, MAX_INITIAL_PHASE};
use crate::types::BridgeConfig;
use bridge_common::FormatVariant;
use std::path::Path;

/// The configuration file name looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "bridge.toml";

/// Loads and validates a `bridge.toml` configuration from a project directory.
///
/// Reads `<project_dir>/bridge.toml`, parses it, and validates every field.
pub fn load_config(project_dir: &Path) -> Result<BridgeConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `bridge.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<BridgeConfig, ConfigError> {
    let config: BridgeConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are in range and consistent.
///
/// Called by the loaders; exposed so that callers applying command-line
/// overrides on top of a loaded file can re-check the result.
pub fn validate_config(config: &BridgeConfig) -> Result<(), ConfigError> {
    FormatVariant::parse(&config.core.format, config.core.lanes)?;

    if let Some(sys) = &config.clocks.sys {
        parse_clock("sys", sys)?;
    }
    parse_clock("housekeeping", &config.clocks.housekeeping)?;

    if config.reset.heartbeat_ticks == 0 {
        return Err(ConfigError::ValidationError(
            "reset.heartbeat_ticks must be positive".to_string(),
        ));
    }
    if config.reset.hold_ticks == 0 && !config.reset.release_on_heartbeat {
        return Err(ConfigError::ValidationError(
            "reset.hold_ticks must be positive unless release_on_heartbeat is set".to_string(),
        ));
    }
    if config.stimulus.initial_phase > MAX_INITIAL_PHASE {
        return Err(ConfigError::ValidationError(format!(
            "stimulus.initial_phase must be 0 or 1, got {}",
            config.stimulus.initial_phase
        )));
    }
    if config.sim.frames == 0 {
        return Err(ConfigError::ValidationError(
            "sim.frames must be positive".to_string(),
        ));
    }
    Ok(())
}
