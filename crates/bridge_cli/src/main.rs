//! Bridge CLI: the command-line interface for the SDI bridge sync core simulator.
//!
//! Provides `bridge sim` for running the core against generated stimulus,
//! `bridge formats` for listing the supported format/lane variants, and
//! `bridge check` for validating a project's `bridge.toml`.

#![warn(missing_docs)]

mod check;
mod formats;
mod pipeline;
mod sim;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Bridge: simulate the SDI bridge synchronization core.
#[derive(Parser, Debug)]
#[command(name = "bridge", version, about = "SDI bridge sync core simulator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `bridge.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the core against generated stimulus and report every frame.
    Sim(SimArgs),
    /// List supported format/lane variants.
    Formats,
    /// Validate `bridge.toml` and print the resolved core.
    Check,
}

/// Arguments for the `bridge sim` subcommand.
#[derive(Parser, Debug)]
pub struct SimArgs {
    /// Video format (e.g., "720p60", "1080p30", "1080p60").
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output lane count (2 or 4).
    #[arg(short, long)]
    pub lanes: Option<u8>,

    /// Stop after this many complete frames.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Simulation time limit (e.g., "100ns", "1us", "10ms").
    #[arg(long)]
    pub time: Option<String>,

    /// Divider phase at power-up (0 or 1).
    #[arg(long)]
    pub phase: Option<u8>,

    /// Output path for the waveform file; a `.gz` suffix compresses it.
    #[arg(short, long)]
    pub waveform: Option<String>,

    /// Disable waveform recording.
    #[arg(long)]
    pub no_waveform: bool,

    /// Output format for the frame reports.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub report: ReportFormat,
}

/// Frame report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Sim(ref args) => sim::run(args, &global),
        Command::Formats => formats::run(&global),
        Command::Check => check::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flag-derived
/// level unless `--quiet` is given.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else {
        let default_level = if cli.verbose { "debug" } else { "warn" };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_sim_default() {
        let cli = Cli::parse_from(["bridge", "sim"]);
        match cli.command {
            Command::Sim(ref args) => {
                assert!(args.format.is_none());
                assert!(args.lanes.is_none());
                assert!(args.frames.is_none());
                assert!(args.time.is_none());
                assert!(args.phase.is_none());
                assert!(args.waveform.is_none());
                assert!(!args.no_waveform);
                assert_eq!(args.report, ReportFormat::Text);
            }
            _ => panic!("expected Sim command"),
        }
    }

    #[test]
    fn parse_sim_with_args() {
        let cli = Cli::parse_from([
            "bridge",
            "sim",
            "--format",
            "1080p60",
            "--lanes",
            "4",
            "--frames",
            "3",
            "--time",
            "40ms",
            "--phase",
            "1",
            "--waveform",
            "out/run.vcd.gz",
            "--report",
            "json",
        ]);
        match cli.command {
            Command::Sim(ref args) => {
                assert_eq!(args.format.as_deref(), Some("1080p60"));
                assert_eq!(args.lanes, Some(4));
                assert_eq!(args.frames, Some(3));
                assert_eq!(args.time.as_deref(), Some("40ms"));
                assert_eq!(args.phase, Some(1));
                assert_eq!(args.waveform.as_deref(), Some("out/run.vcd.gz"));
                assert_eq!(args.report, ReportFormat::Json);
            }
            _ => panic!("expected Sim command"),
        }
    }

    #[test]
    fn parse_sim_short_flags() {
        let cli = Cli::parse_from(["bridge", "sim", "-f", "720p60", "-l", "2", "--no-waveform"]);
        match cli.command {
            Command::Sim(ref args) => {
                assert_eq!(args.format.as_deref(), Some("720p60"));
                assert_eq!(args.lanes, Some(2));
                assert!(args.no_waveform);
            }
            _ => panic!("expected Sim command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["bridge", "--quiet", "formats"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Command::Formats));
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["bridge", "check", "--verbose", "--config", "/tmp/bridge.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("/tmp/bridge.toml"));
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn invalid_report_format_rejected() {
        let result = Cli::try_parse_from(["bridge", "sim", "--report", "xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_subcommand_rejected() {
        assert!(Cli::try_parse_from(["bridge"]).is_err());
    }
}
