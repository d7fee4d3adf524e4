//! Parsing and validation of `bridge.toml` core configuration files.
//!
//! This crate reads the configuration file into a strongly-typed [`BridgeConfig`]
//! and resolves it into a [`ResolvedCore`]: the format variant, its timing table
//! and profile, concrete clock frequencies, the reset policy, and stimulus settings.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_config, load_config_file, load_config_from_str, validate_config, CONFIG_FILE_NAME,
};
pub use resolve::{resolve_core, ResetPolicy, ResolvedCore, StimulusSettings, MIN_TRS_OFFSET};
pub use types::*;
