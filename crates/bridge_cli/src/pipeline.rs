//! Shared helpers for locating and loading the project configuration and
//! parsing command-line values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bridge_config::{BridgeConfig, CONFIG_FILE_NAME};
use bridge_sim::time::{FS_PER_MS, FS_PER_NS, FS_PER_PS, FS_PER_S, FS_PER_US};
use bridge_sim::SimTime;

use crate::GlobalArgs;

/// A loaded configuration and the directory its relative paths resolve against.
#[derive(Debug)]
pub struct Project {
    /// Directory holding `bridge.toml`, or the working directory when running
    /// without one.
    pub dir: PathBuf,
    /// Path of the loaded configuration file, if any.
    pub config_path: Option<PathBuf>,
    /// The validated configuration.
    pub config: BridgeConfig,
}

impl Project {
    /// Resolves a path from the configuration against the project directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.dir.join(path)
        }
    }
}

/// Finds the project root by walking up from `start` looking for `bridge.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the configuration file from global CLI args.
///
/// If `--config` is specified, uses that path (file → itself, directory →
/// its `bridge.toml`). Otherwise walks up from the current directory.
pub fn resolve_config_path(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_dir() {
            Ok(p.join(CONFIG_FILE_NAME))
        } else {
            Ok(p)
        }
    } else {
        Ok(find_project_root(&std::env::current_dir()?)?.join(CONFIG_FILE_NAME))
    }
}

/// Loads the project configuration named by `--config` or found above the
/// working directory.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    let path = resolve_config_path(global)?;
    load_project_file(&path)
}

/// Like [`load_project`], but falls back to the default configuration when
/// no `--config` is given and no `bridge.toml` exists above the working
/// directory.
pub fn load_project_or_default(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    if global.config.is_some() {
        return load_project(global);
    }
    let cwd = std::env::current_dir()?;
    match find_project_root(&cwd) {
        Ok(root) => load_project_file(&root.join(CONFIG_FILE_NAME)),
        Err(_) => {
            tracing::debug!(dir = %cwd.display(), "no configuration found, using defaults");
            Ok(Project {
                dir: cwd,
                config_path: None,
                config: BridgeConfig::default(),
            })
        }
    }
}

fn load_project_file(path: &Path) -> Result<Project, Box<dyn std::error::Error>> {
    let config = bridge_config::load_config_file(path)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(Project {
        dir,
        config_path: Some(path.to_path_buf()),
        config,
    })
}

/// Parses a duration string like "100ns", "1us", "40ms" into a [`SimTime`].
///
/// Supported units: fs, ps, ns, us, ms, s.
pub fn parse_duration(s: &str) -> Result<SimTime, Box<dyn std::error::Error>> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".into());
    }

    let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digit_end == 0 {
        return Err(format!("invalid duration: no numeric value in '{s}'").into());
    }

    let number: u64 = s[..digit_end]
        .parse()
        .map_err(|_| format!("invalid number in duration '{s}'"))?;

    let unit = s[digit_end..].trim();
    let multiplier = match unit {
        "fs" => 1,
        "ps" => FS_PER_PS,
        "ns" => FS_PER_NS,
        "us" => FS_PER_US,
        "ms" => FS_PER_MS,
        "s" => FS_PER_S,
        "" => {
            return Err(
                format!("missing unit in duration '{s}' (use fs, ps, ns, us, ms, or s)").into(),
            )
        }
        _ => {
            return Err(
                format!("unknown duration unit '{unit}' (use fs, ps, ns, us, ms, or s)").into(),
            )
        }
    };

    let fs = number
        .checked_mul(multiplier)
        .ok_or_else(|| format!("duration '{s}' is too long"))?;
    Ok(SimTime::from_fs(fs))
}

/// Renders a width histogram as `"720x1280, 1x1"` (count x width).
pub fn describe_widths(widths: &BTreeMap<u32, u32>) -> String {
    if widths.is_empty() {
        return "none".to_string();
    }
    widths
        .iter()
        .rev()
        .map(|(width, count)| format!("{count}x{width}"))
        .collect::<Vec<_>>()
        .join(", ")
}
