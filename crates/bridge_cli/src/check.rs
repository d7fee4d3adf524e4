//! `bridge check`: validate `bridge.toml` and print the resolved core.

use bridge_config::ResolvedCore;

use crate::pipeline::{load_project, Project};
use crate::GlobalArgs;

/// Runs the `bridge check` command.
///
/// Fails when no configuration file is found or it does not resolve to a
/// supported core.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    if !global.quiet {
        if let Some(path) = &project.config_path {
            eprintln!("   Checking {}", path.display());
        }
    }

    let core = bridge_config::resolve_core(&project.config)?;
    for line in describe_core(&core, &project) {
        println!("{line}");
    }
    if !global.quiet {
        eprintln!("   Configuration OK");
    }
    Ok(0)
}

/// The resolved core, one `key: value` line per setting.
fn describe_core(core: &ResolvedCore, project: &Project) -> Vec<String> {
    let t = &core.timings;
    let mut lines = vec![
        format!("variant: {}", core.variant),
        format!(
            "timings: {}x{} in {}x{}",
            t.h_active(),
            t.v_active(),
            t.h_total(),
            t.v_total()
        ),
        format!("sys clock: {}", core.sys_clock),
        format!(
            "pixel clock: {} ({} byte(s) per pixel)",
            core.pixel_clock(),
            core.bytes_per_pixel()
        ),
        format!("housekeeping clock: {}", core.housekeeping_clock),
        format!(
            "reset: release after {}, heartbeat every {} tick(s), button {}",
            if core.reset.release_on_heartbeat {
                "first heartbeat".to_string()
            } else {
                format!("{} tick(s)", core.reset.hold_ticks)
            },
            core.reset.heartbeat_ticks,
            if core.reset.button { "wired" } else { "absent" }
        ),
        format!(
            "stimulus: preamble {} pixel(s) after active video, divider phase {}",
            core.stimulus.trs_offset, core.stimulus.initial_phase
        ),
        format!("frames: {}", core.frames),
    ];
    if let Some(waveform) = &core.waveform {
        lines.push(format!(
            "waveform: {}",
            project.resolve_path(waveform).display()
        ));
    }
    lines
}
