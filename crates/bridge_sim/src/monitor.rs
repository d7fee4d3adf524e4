//! Frame monitor: turns pixel-domain `(fv_o, lv_o)` samples into per-frame
//! reports and checks them against the format's expected window.

use std::collections::BTreeMap;

use bridge_common::{FrameEnd, TimingProfile, VideoTimings};
use serde::Serialize;

use crate::time::SimTime;

/// One pixel clock's worth of observed outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonitorSample {
    /// Time of the pixel edge.
    pub time: SimTime,
    /// Frame-valid.
    pub fv: bool,
    /// Line-valid.
    pub lv: bool,
    /// A vertical sync edge is pending in the timing generator.
    pub vsync_edge: bool,
    /// Slips requested since power-up.
    pub slips: u64,
    /// Detector aligned output.
    pub aligned: bool,
}

/// Measurements of one frame, from one `fv_o` rising edge to the next.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    /// Zero-based frame number since the monitor armed.
    pub index: u32,
    /// Time of the opening `fv_o` rising edge.
    pub start: SimTime,
    /// Pixel cycles between the opening and closing `fv_o` rising edges.
    pub period_cycles: u64,
    /// Pixel cycles with `fv_o` high.
    pub fv_cycles: u64,
    /// `lv_o` pulse width in pixels mapped to the number of pulses.
    pub line_widths: BTreeMap<u32, u32>,
    /// Width of the low gaps between consecutive `lv_o` pulses.
    pub gap_widths: BTreeMap<u32, u32>,
    /// Slips requested during the frame.
    pub slips: u64,
    /// Detector alignment at the end of the frame.
    pub aligned: bool,
}

impl FrameReport {
    /// Number of `lv_o` pulses exactly `width` pixels wide.
    pub fn lines_of(&self, width: u32) -> u32 {
        self.line_widths.get(&width).copied().unwrap_or(0)
    }

    /// Total `lv_o` pulses in the frame.
    pub fn pulses(&self) -> u32 {
        self.line_widths.values().sum()
    }
}

/// The window a correctly synchronized core traces for a format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpectedFrame {
    /// Active lines.
    pub active_lines: u32,
    /// Active pixels per line.
    pub line_width: u32,
    /// Horizontal blanking between lines.
    pub gap_width: u32,
    /// Pixel cycles per frame.
    pub period_cycles: u64,
    /// Pixel cycles with `fv_o` high.
    pub fv_cycles: u64,
    /// One-cycle `lv_o` pulses at the frame-end boundary.
    pub boundary_pulses: u32,
}

impl ExpectedFrame {
    /// Derives the expected window from a timing table and profile.
    ///
    /// The hold-counter rules raise `fv_o` during the blanking of the last
    /// line, one horizontal blanking period before the first active line; the
    /// blanking-window rule keeps exactly `V_ACTIVE` lines' worth of cycles.
    pub fn for_core(timings: &VideoTimings, profile: &TimingProfile) -> Self {
        let ht = u64::from(timings.h_total());
        let ha = u64::from(timings.h_active());
        let va = u64::from(timings.v_active());
        let (fv_cycles, boundary_pulses) = match profile.frame_end {
            FrameEnd::Hold {
                exclude_boundary: false,
            } => (va * ht + ht - ha + 1, 1),
            FrameEnd::Hold {
                exclude_boundary: true,
            } => (va * ht + ht - ha, 0),
            FrameEnd::BlankingWindow { .. } => (va * ht, 0),
        };
        Self {
            active_lines: u32::from(timings.v_active()),
            line_width: u32::from(timings.h_active()),
            gap_width: u32::from(timings.h_blanking()),
            period_cycles: timings.frame_cycles(),
            fv_cycles,
            boundary_pulses,
        }
    }

    /// Lists every way `report` differs from this window. Empty when it matches.
    pub fn mismatches(&self, report: &FrameReport) -> Vec<String> {
        let mut problems = Vec::new();

        if report.period_cycles != self.period_cycles {
            problems.push(format!(
                "frame period: expected {} pixel cycles, got {}",
                self.period_cycles, report.period_cycles
            ));
        }
        if report.fv_cycles != self.fv_cycles {
            problems.push(format!(
                "frame valid: expected {} pixel cycles, got {}",
                self.fv_cycles, report.fv_cycles
            ));
        }

        let mut widths = BTreeMap::new();
        widths.insert(self.line_width, self.active_lines);
        if self.boundary_pulses > 0 {
            widths.insert(1, self.boundary_pulses);
        }
        if report.line_widths != widths {
            problems.push(format!(
                "line valid: expected {} lines of {} pixels, got {}",
                self.active_lines,
                self.line_width,
                describe(&report.line_widths)
            ));
        }

        if let Some(bad) = report.gap_widths.keys().find(|g| **g != self.gap_width) {
            problems.push(format!(
                "line gap: expected {} pixels, got {bad}",
                self.gap_width
            ));
        }

        problems
    }
}

/// Formats a width histogram as `"720x1280, 1x1"`.
fn describe(histogram: &BTreeMap<u32, u32>) -> String {
    if histogram.is_empty() {
        return "none".to_string();
    }
    histogram
        .iter()
        .rev()
        .map(|(width, count)| format!("{count}x{width}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug)]
struct OpenFrame {
    start: SimTime,
    start_slips: u64,
    cycles: u64,
    fv_cycles: u64,
    line_widths: BTreeMap<u32, u32>,
    gap_widths: BTreeMap<u32, u32>,
    run: u32,
    gap: u32,
    seen_line: bool,
    last: MonitorSample,
}

impl OpenFrame {
    fn new(sample: MonitorSample) -> Self {
        Self {
            start: sample.time,
            start_slips: sample.slips,
            cycles: 0,
            fv_cycles: 0,
            line_widths: BTreeMap::new(),
            gap_widths: BTreeMap::new(),
            run: 0,
            gap: 0,
            seen_line: false,
            last: sample,
        }
    }

    fn push(&mut self, sample: MonitorSample) {
        self.cycles += 1;
        if sample.fv {
            self.fv_cycles += 1;
        }
        if sample.lv {
            if self.run == 0 && self.seen_line {
                *self.gap_widths.entry(self.gap).or_default() += 1;
            }
            self.run += 1;
            self.gap = 0;
        } else {
            self.end_line();
            self.gap += 1;
        }
        self.last = sample;
    }

    fn end_line(&mut self) {
        if self.run > 0 {
            *self.line_widths.entry(self.run).or_default() += 1;
            self.seen_line = true;
            self.run = 0;
        }
    }

    fn close(mut self, index: u32) -> FrameReport {
        self.end_line();
        FrameReport {
            index,
            start: self.start,
            period_cycles: self.cycles,
            fv_cycles: self.fv_cycles,
            line_widths: self.line_widths,
            gap_widths: self.gap_widths,
            slips: self.last.slips - self.start_slips,
            aligned: self.last.aligned,
        }
    }
}

/// Watches the pixel-domain outputs and reports complete frames.
///
/// The monitor arms on the first vertical sync edge, so frames traced by
/// free-running counters before the first sync are never reported. A frame
/// opens on a `fv_o` rising edge and is reported when the next one arrives.
#[derive(Debug, Default)]
pub struct FrameMonitor {
    armed: bool,
    prev_fv: bool,
    open: Option<OpenFrame>,
    reported: u32,
}

impl FrameMonitor {
    /// A disarmed monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a vertical sync edge has been seen.
    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Frames reported so far.
    pub fn reported(&self) -> u32 {
        self.reported
    }

    /// Consumes one pixel clock's sample; returns a report when it closes a frame.
    pub fn observe(&mut self, sample: MonitorSample) -> Option<FrameReport> {
        let rising = sample.fv && !self.prev_fv;
        self.prev_fv = sample.fv;

        if !self.armed {
            self.armed = sample.vsync_edge;
            return None;
        }

        let mut report = None;
        if rising {
            if let Some(frame) = self.open.take() {
                report = Some(frame.close(self.reported));
                self.reported += 1;
            }
            self.open = Some(OpenFrame::new(sample));
        }
        if let Some(frame) = self.open.as_mut() {
            frame.push(sample);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_common::{FormatVariant, LaneCount, VideoFormat};

    fn sample(fv: bool, lv: bool) -> MonitorSample {
        MonitorSample {
            fv,
            lv,
            ..MonitorSample::default()
        }
    }

    /// One synthetic frame: `fv` high for `lines` lines of `width + gap`,
    /// then `tail` cycles low.
    fn frame(lines: u32, width: u32, gap: u32, tail: u32) -> Vec<MonitorSample> {
        let mut out = Vec::new();
        for _ in 0..lines {
            out.extend((0..width).map(|_| sample(true, true)));
            out.extend((0..gap).map(|_| sample(true, false)));
        }
        out.extend((0..tail).map(|_| sample(false, false)));
        out
    }

    fn armed() -> FrameMonitor {
        let mut m = FrameMonitor::new();
        m.observe(MonitorSample {
            vsync_edge: true,
            ..MonitorSample::default()
        });
        assert!(m.armed());
        m
    }

    #[test]
    fn ignores_frames_before_arming() {
        let mut m = FrameMonitor::new();
        let reports: Vec<_> = frame(3, 4, 2, 5)
            .into_iter()
            .chain(frame(3, 4, 2, 5))
            .filter_map(|s| m.observe(s))
            .collect();
        assert!(reports.is_empty());
        assert_eq!(m.reported(), 0);
    }

    #[test]
    fn reports_frame_on_next_rising_edge() {
        let mut m = armed();
        let mut reports = Vec::new();
        for s in frame(3, 4, 2, 5).into_iter().chain(frame(3, 4, 2, 5)) {
            reports.extend(m.observe(s));
        }
        assert_eq!(reports.len(), 1);
        let r = &reports[0];
        assert_eq!(r.index, 0);
        assert_eq!(r.period_cycles, 3 * 6 + 5);
        assert_eq!(r.fv_cycles, 18);
        assert_eq!(r.lines_of(4), 3);
        assert_eq!(r.pulses(), 3);
        assert_eq!(r.gap_widths.get(&2), Some(&2));
    }

    #[test]
    fn counts_slips_within_frame() {
        let mut m = armed();
        let mut samples = frame(2, 3, 1, 2);
        samples.extend(frame(2, 3, 1, 2));
        for (i, s) in samples.iter_mut().enumerate() {
            s.slips = if i < 3 { 10 } else { 12 };
            s.aligned = i >= 5;
        }
        let reports: Vec<_> = samples.into_iter().filter_map(|s| m.observe(s)).collect();
        assert_eq!(reports[0].slips, 2);
        assert!(reports[0].aligned);
    }

    #[test]
    fn expected_frame_720p60() {
        let v = FormatVariant::new(VideoFormat::Hd720p60, LaneCount::Two);
        let e = ExpectedFrame::for_core(&v.timings(), &v.profile());
        assert_eq!(e.period_cycles, 1_237_500);
        assert_eq!(e.gap_width, 370);
        assert_eq!(e.fv_cycles, 720 * 1650 + 370 + 1);
        assert_eq!(e.boundary_pulses, 1);
    }

    #[test]
    fn expected_frame_1080p60_has_no_boundary_pulse() {
        let v = FormatVariant::new(VideoFormat::Hd1080p60, LaneCount::Four);
        let e = ExpectedFrame::for_core(&v.timings(), &v.profile());
        assert_eq!(e.period_cycles, 2200 * 1125);
        assert_eq!(e.fv_cycles, 1080 * 2200);
        assert_eq!(e.boundary_pulses, 0);
    }

    #[test]
    fn mismatches_empty_for_matching_report() {
        let e = ExpectedFrame {
            active_lines: 3,
            line_width: 4,
            gap_width: 2,
            period_cycles: 23,
            fv_cycles: 18,
            boundary_pulses: 0,
        };
        let mut m = armed();
        let reports: Vec<_> = frame(3, 4, 2, 5)
            .into_iter()
            .chain(frame(3, 4, 2, 5))
            .filter_map(|s| m.observe(s))
            .collect();
        assert!(e.mismatches(&reports[0]).is_empty());
    }

    #[test]
    fn mismatches_describe_each_problem() {
        let e = ExpectedFrame {
            active_lines: 3,
            line_width: 4,
            gap_width: 2,
            period_cycles: 23,
            fv_cycles: 18,
            boundary_pulses: 0,
        };
        let mut report = FrameReport {
            period_cycles: 24,
            fv_cycles: 18,
            ..FrameReport::default()
        };
        report.line_widths.insert(4, 2);
        report.line_widths.insert(3, 1);
        report.gap_widths.insert(3, 1);
        let problems = e.mismatches(&report);
        assert_eq!(problems.len(), 3);
        assert!(problems[0].contains("frame period"));
        assert_eq!(
            problems[1],
            "line valid: expected 3 lines of 4 pixels, got 2x4, 1x3"
        );
        assert!(problems[2].contains("line gap"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = FrameReport::default();
        report.line_widths.insert(1280, 720);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["line_widths"]["1280"], 720);
        assert_eq!(json["start"], 0);
    }
}
