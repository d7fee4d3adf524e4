//! The closed set of supported video formats, lane counts, and their variants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;
use crate::frequency::Frequency;
use crate::profile::TimingProfile;
use crate::timings::VideoTimings;

/// A supported video format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoFormat {
    /// 1280×720 progressive, 60 frames per second.
    #[serde(rename = "720p60")]
    Hd720p60,
    /// 1920×1080 progressive, 30 frames per second.
    #[serde(rename = "1080p30")]
    Hd1080p30,
    /// 1920×1080 progressive, 60 frames per second.
    #[serde(rename = "1080p60")]
    Hd1080p60,
}

impl VideoFormat {
    /// Every supported format, in table order.
    pub const ALL: [VideoFormat; 3] = [
        VideoFormat::Hd720p60,
        VideoFormat::Hd1080p30,
        VideoFormat::Hd1080p60,
    ];

    /// The canonical short name (`"720p60"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoFormat::Hd720p60 => "720p60",
            VideoFormat::Hd1080p30 => "1080p30",
            VideoFormat::Hd1080p60 => "1080p60",
        }
    }

    /// The nominal pixel clock for this format.
    pub fn pixel_clock(&self) -> Frequency {
        let hz = match self {
            VideoFormat::Hd720p60 | VideoFormat::Hd1080p30 => 74_250_000,
            VideoFormat::Hd1080p60 => 148_500_000,
        };
        Frequency::from_hz(hz).unwrap_or_else(|| unreachable!("pixel clocks are non-zero"))
    }

    /// Whether the pixel clock is derived from the byte clock by a divide-by-2
    /// divider, which also makes the bit-alignment loop meaningful.
    pub fn uses_divider(&self) -> bool {
        matches!(self, VideoFormat::Hd720p60 | VideoFormat::Hd1080p30)
    }

    fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FormatError::UnsupportedFormat {
                name: s.to_string(),
                supported: Self::supported_list(),
            })
    }
}

/// Number of output data lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LaneCount {
    /// Two data lanes.
    Two,
    /// Four data lanes.
    Four,
}

impl LaneCount {
    /// The lane count as a number.
    pub fn count(&self) -> u8 {
        match self {
            LaneCount::Two => 2,
            LaneCount::Four => 4,
        }
    }
}

impl TryFrom<u8> for LaneCount {
    type Error = FormatError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            2 => Ok(LaneCount::Two),
            4 => Ok(LaneCount::Four),
            other => Err(FormatError::UnsupportedLanes(other)),
        }
    }
}

impl From<LaneCount> for u8 {
    fn from(lanes: LaneCount) -> u8 {
        lanes.count()
    }
}

impl fmt::Display for LaneCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}lanes", self.count())
    }
}

/// A format/lane-count combination: the unit a core is instantiated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatVariant {
    /// The video format.
    pub format: VideoFormat,
    /// The lane count.
    pub lanes: LaneCount,
}

impl FormatVariant {
    /// Every supported combination.
    pub const ALL: [FormatVariant; 6] = [
        FormatVariant::new(VideoFormat::Hd720p60, LaneCount::Two),
        FormatVariant::new(VideoFormat::Hd720p60, LaneCount::Four),
        FormatVariant::new(VideoFormat::Hd1080p30, LaneCount::Two),
        FormatVariant::new(VideoFormat::Hd1080p30, LaneCount::Four),
        FormatVariant::new(VideoFormat::Hd1080p60, LaneCount::Two),
        FormatVariant::new(VideoFormat::Hd1080p60, LaneCount::Four),
    ];

    /// Creates a variant.
    pub const fn new(format: VideoFormat, lanes: LaneCount) -> Self {
        Self { format, lanes }
    }

    /// Parses a format name and numeric lane count, rejecting unsupported values.
    pub fn parse(format: &str, lanes: u8) -> Result<Self, FormatError> {
        Ok(Self::new(format.parse()?, LaneCount::try_from(lanes)?))
    }

    /// The format's timing table.
    pub fn timings(&self) -> VideoTimings {
        VideoTimings::for_format(self.format)
    }

    /// The timing-generator profile for this variant.
    pub fn profile(&self) -> TimingProfile {
        TimingProfile::for_variant(*self)
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.format, self.lanes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_format_names() {
        assert_eq!("720p60".parse::<VideoFormat>().unwrap(), VideoFormat::Hd720p60);
        assert_eq!("1080P30".parse::<VideoFormat>().unwrap(), VideoFormat::Hd1080p30);
        assert_eq!(" 1080p60 ".parse::<VideoFormat>().unwrap(), VideoFormat::Hd1080p60);
    }

    #[test]
    fn parse_unknown_format_lists_supported() {
        let err = "1080p25".parse::<VideoFormat>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported video format '1080p25' (supported: 720p60, 1080p30, 1080p60)"
        );
    }

    #[test]
    fn lane_count_conversion() {
        assert_eq!(LaneCount::try_from(2).unwrap(), LaneCount::Two);
        assert_eq!(LaneCount::try_from(4).unwrap(), LaneCount::Four);
        assert_eq!(
            LaneCount::try_from(1).unwrap_err(),
            FormatError::UnsupportedLanes(1)
        );
        assert_eq!(u8::from(LaneCount::Four), 4);
    }

    #[test]
    fn variant_parse_and_display() {
        let v = FormatVariant::parse("720p60", 4).unwrap();
        assert_eq!(v.to_string(), "720p60-4lanes");
        assert!(FormatVariant::parse("720p60", 3).is_err());
        assert!(FormatVariant::parse("576i", 2).is_err());
    }

    #[test]
    fn divider_only_for_74_25_mhz_formats() {
        assert!(VideoFormat::Hd720p60.uses_divider());
        assert!(VideoFormat::Hd1080p30.uses_divider());
        assert!(!VideoFormat::Hd1080p60.uses_divider());
        assert_eq!(VideoFormat::Hd1080p60.pixel_clock().hz(), 148_500_000);
    }

    #[test]
    fn variant_serde_uses_short_names() {
        let v = FormatVariant::new(VideoFormat::Hd1080p30, LaneCount::Two);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"format":"1080p30","lanes":2}"#);
        let back: FormatVariant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn every_variant_profile_fits_its_timings() {
        for v in FormatVariant::ALL {
            v.profile()
                .validate(&v.timings())
                .unwrap_or_else(|e| panic!("{v}: {e}"));
        }
    }
}
