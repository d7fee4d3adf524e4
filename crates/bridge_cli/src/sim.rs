//! `bridge sim`: run the core against generated stimulus.
//!
//! Loads `bridge.toml` (or the defaults when there is none), applies the
//! command-line overrides, and simulates until the requested number of frames
//! has been traced or the time limit is reached. Frame reports go to stdout,
//! status lines and mismatches to stderr.

use std::path::PathBuf;

use bridge_config::{BridgeConfig, ResolvedCore};
use bridge_sim::{FrameReport, SimConfig, SimResult};

use crate::pipeline::{describe_widths, load_project_or_default, parse_duration, Project};
use crate::{GlobalArgs, ReportFormat, SimArgs};

/// Runs the `bridge sim` command.
///
/// Returns exit code 0 when at least one frame was traced and every traced
/// frame matches the format's expected window, 1 otherwise.
pub fn run(args: &SimArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut project = load_project_or_default(global)?;
    apply_overrides(&mut project.config, args);
    let core = bridge_config::resolve_core(&project.config)?;

    let time_limit = args.time.as_deref().map(parse_duration).transpose()?;
    let waveform_path = waveform_path(args, &project, &core)?;
    let sim_config = SimConfig {
        frames: Some(core.frames),
        time_limit,
        waveform_path: waveform_path.clone(),
        record_waveform: waveform_path.is_some(),
    };

    if !global.quiet {
        eprintln!(
            "   Simulating {} (sys {}, hk {}, phase {})",
            core.variant, core.sys_clock, core.housekeeping_clock, core.stimulus.initial_phase
        );
    }

    let result = bridge_sim::simulate(&core, &sim_config)?;

    match args.report {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        ReportFormat::Text => {
            if global.verbose {
                eprintln!(
                    "   Expected {} lines of {} pixels, period {} cycles, fv {} cycles",
                    result.expected.active_lines,
                    result.expected.line_width,
                    result.expected.period_cycles,
                    result.expected.fv_cycles
                );
            }
            for frame in &result.frames {
                println!("{}", frame_line(frame));
            }
        }
    }

    let mismatches = result.mismatches();
    for (index, problems) in &mismatches {
        for problem in problems {
            eprintln!("   FAILED frame {index}: {problem}");
        }
    }

    if !global.quiet {
        print_summary(&result, waveform_path.as_ref());
    }

    if result.frames.is_empty() {
        eprintln!(
            "   FAILED: no complete frame traced by {}",
            result.final_time
        );
        Ok(1)
    } else if mismatches.is_empty() {
        Ok(0)
    } else {
        eprintln!(
            "   FAILED: {} of {} frame(s) do not match {}",
            mismatches.len(),
            result.frames.len(),
            result.variant
        );
        Ok(1)
    }
}

/// Writes the command-line selections over the loaded configuration.
fn apply_overrides(config: &mut BridgeConfig, args: &SimArgs) {
    if let Some(format) = &args.format {
        config.core.format = format.clone();
    }
    if let Some(lanes) = args.lanes {
        config.core.lanes = lanes;
    }
    if let Some(frames) = args.frames {
        config.sim.frames = frames;
    }
    if let Some(phase) = args.phase {
        config.stimulus.initial_phase = phase;
    }
}

/// Picks the waveform output: `--waveform` relative to the working directory,
/// else `[sim] waveform` relative to the project. Creates the parent directory.
fn waveform_path(
    args: &SimArgs,
    project: &Project,
    core: &ResolvedCore,
) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    if args.no_waveform {
        return Ok(None);
    }
    let path = match (&args.waveform, &core.waveform) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => project.resolve_path(p),
        (None, None) => return Ok(None),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Some(path))
}

/// One report line per traced frame.
fn frame_line(frame: &FrameReport) -> String {
    let lock = if frame.aligned { "aligned" } else { "unaligned" };
    format!(
        "frame {}: start {:.3} us, period {} cycles, fv {} cycles, lines {}, {lock}, {} slip(s)",
        frame.index,
        frame.start.as_us_f64(),
        frame.period_cycles,
        frame.fv_cycles,
        describe_widths(&frame.line_widths),
        frame.slips
    )
}

fn print_summary(result: &SimResult, waveform: Option<&PathBuf>) {
    eprintln!(
        "   Simulation finished at {} ({} sys / {} pix / {} hk cycles)",
        result.final_time, result.sys_cycles, result.pix_cycles, result.hk_cycles
    );
    if !result.reset_released {
        eprintln!("   Reset: still asserted");
    } else if result.aligned {
        eprintln!("   Alignment: locked after {} slip(s)", result.slips);
    } else {
        eprintln!("   Alignment: searching ({} slip(s) so far)", result.slips);
    }
    if let Some(path) = waveform {
        eprintln!("   Waveform: {}", path.display());
    }
}
