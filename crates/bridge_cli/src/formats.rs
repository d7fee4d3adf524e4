//! `bridge formats`: list the supported format/lane variants.

use bridge_common::{FormatVariant, FrameEnd, TimingProfile};

use crate::GlobalArgs;

/// Runs the `bridge formats` command. Always succeeds.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    if !global.quiet {
        eprintln!("   Listing {} variants", FormatVariant::ALL.len());
    }
    for variant in FormatVariant::ALL {
        println!("{}", variant_summary(variant));
        if global.verbose {
            println!("    profile: {}", describe_profile(&variant.profile()));
        }
    }
    Ok(0)
}

/// A one-line summary: name, clocks, active area, totals and reload values.
fn variant_summary(variant: FormatVariant) -> String {
    let t = variant.timings();
    let p = variant.profile();
    let pixel = variant.format.pixel_clock();
    let bytes_per_pixel = if variant.format.uses_divider() { 2 } else { 1 };
    let alignment = if variant.format.uses_divider() {
        "bit alignment"
    } else {
        "no alignment loop"
    };
    format!(
        "{:<16} pixel {:<10} sys {:<10} {}x{} H {} (fp {}, sync {}, bp {}) V {} (fp {}, sync {}, bp {}) reload {}/{}, {alignment}",
        variant.to_string(),
        pixel.to_string(),
        pixel.scaled(bytes_per_pixel).to_string(),
        t.h_active(),
        t.v_active(),
        t.h_total(),
        t.h_front_porch(),
        t.h_sync(),
        t.h_back_porch(),
        t.v_total(),
        t.v_front_porch(),
        t.v_sync(),
        t.v_back_porch(),
        p.reload_pixel(&t),
        p.start_line(&t),
    )
}

/// How a profile shapes frame-valid.
fn describe_profile(profile: &TimingProfile) -> String {
    let end = match profile.frame_end {
        FrameEnd::Hold {
            exclude_boundary: false,
        } => "hold counter".to_string(),
        FrameEnd::Hold {
            exclude_boundary: true,
        } => "hold counter, boundary pixel excluded".to_string(),
        FrameEnd::BlankingWindow { sync_delay } => {
            format!("blanking window, sync delay {sync_delay}")
        }
    };
    format!(
        "{end}; {} fv stage(s); reload skew {}, line lead {}",
        profile.fv_stages.depth(),
        profile.reload_skew,
        profile.line_lead
    )
}
