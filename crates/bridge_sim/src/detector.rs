//! EAV preamble detector.
//!
//! Scans the byte stream during line blanking for `FF FF 00 00 00 00 B6 B6`
//! and samples the divided pixel clock once per preamble segment. The byte
//! phase is trusted (`aligned`) only when the sequence completed and all three
//! samples saw the pixel clock high.

use bridge_common::is_status_byte;

use crate::sync::StableWindow;

/// Detector scan state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScanState {
    /// Looking for the two `0xFF` bytes.
    #[default]
    First,
    /// Looking for the four `0x00` bytes.
    Second,
    /// Looking for the two status bytes.
    Third,
    /// A full preamble was seen; sticky until reset.
    Locked,
}

/// Inputs sampled on one byte clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetectorInputs {
    /// The deserialized byte.
    pub data: u8,
    /// Line-valid, synchronized into the byte domain.
    pub lv: bool,
    /// Momentary level of the divided pixel clock.
    pub pixel_level: bool,
}

/// Registers of the preamble detector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreambleDetector {
    state: ScanState,
    first_count: u8,
    second_count: u8,
    third_count: u8,
    flags: StableWindow<3>,
    aligned: bool,
}

impl PreambleDetector {
    /// `0xFF` bytes in the first segment.
    const FIRST_LEN: u8 = 2;
    /// `0x00` bytes in the second segment.
    const SECOND_LEN: u8 = 4;
    /// Status bytes in the third segment.
    const THIRD_LEN: u8 = 2;

    /// A detector in its reset state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scan state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Whether the full sequence has been seen since reset.
    pub fn sequence_complete(&self) -> bool {
        self.state == ScanState::Locked
    }

    /// The registered aligned output.
    pub fn aligned(&self) -> bool {
        self.aligned
    }

    /// High while alignment is still needed.
    pub fn n_align(&self) -> bool {
        !self.aligned
    }

    /// The latched pixel clock samples.
    pub fn flags(&self) -> StableWindow<3> {
        self.flags
    }

    /// Back to the first segment with all counters cleared.
    fn restart(&self) -> Self {
        Self {
            state: ScanState::First,
            first_count: 0,
            second_count: 0,
            third_count: 0,
            ..*self
        }
    }

    /// Back to the first segment, counting the current `0xFF` as its first byte.
    fn restart_from_ff(&self) -> Self {
        Self {
            first_count: 1,
            ..self.restart()
        }
    }

    /// Computes the registers after one byte clock edge.
    pub fn next(&self, inputs: DetectorInputs) -> Self {
        let aligned = self.aligned || (self.sequence_complete() && self.flags.is_stable());
        let data = inputs.data;

        let next = match self.state {
            ScanState::Locked => *self,
            _ if inputs.lv => self.restart(),
            ScanState::First if data == 0xFF => {
                if self.first_count < Self::FIRST_LEN - 1 {
                    Self {
                        first_count: self.first_count + 1,
                        ..*self
                    }
                } else {
                    Self {
                        state: ScanState::Second,
                        second_count: 0,
                        flags: self.flags.latch(0, inputs.pixel_level),
                        ..*self
                    }
                }
            }
            ScanState::Second if data == 0x00 => {
                if self.second_count < Self::SECOND_LEN - 1 {
                    Self {
                        second_count: self.second_count + 1,
                        ..*self
                    }
                } else {
                    Self {
                        state: ScanState::Third,
                        third_count: 0,
                        flags: self.flags.latch(1, inputs.pixel_level),
                        ..*self
                    }
                }
            }
            ScanState::Third if is_status_byte(data) => {
                if self.third_count < Self::THIRD_LEN - 1 {
                    Self {
                        third_count: self.third_count + 1,
                        ..*self
                    }
                } else {
                    Self {
                        state: ScanState::Locked,
                        flags: self.flags.latch(2, inputs.pixel_level),
                        ..*self
                    }
                }
            }
            ScanState::Second | ScanState::Third if data == 0xFF => self.restart_from_ff(),
            _ => self.restart(),
        };

        Self { aligned, ..next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_common::EAV_PREAMBLE;

    fn blank(data: u8, pixel_level: bool) -> DetectorInputs {
        DetectorInputs {
            data,
            lv: false,
            pixel_level,
        }
    }

    fn feed(det: PreambleDetector, bytes: &[u8], level: bool) -> PreambleDetector {
        bytes.iter().fold(det, |d, b| d.next(blank(*b, level)))
    }

    #[test]
    fn exact_preamble_locks_in_eight_cycles() {
        let mut det = PreambleDetector::new();
        for (i, byte) in EAV_PREAMBLE.iter().enumerate() {
            assert_ne!(det.state(), ScanState::Locked, "locked early at byte {i}");
            det = det.next(blank(*byte, true));
        }
        assert_eq!(det.state(), ScanState::Locked);
        assert!(det.sequence_complete());
    }

    #[test]
    fn aligned_registers_one_cycle_after_lock() {
        let det = feed(PreambleDetector::new(), &EAV_PREAMBLE, true);
        assert!(!det.aligned());
        assert!(det.n_align());
        let det = det.next(blank(0x10, false));
        assert!(det.aligned());
        assert!(!det.n_align());
        // Sticky.
        let det = feed(det, &[0x00, 0x42, 0xFF], false);
        assert!(det.aligned());
    }

    #[test]
    fn wrong_phase_locks_without_aligning() {
        let det = feed(PreambleDetector::new(), &EAV_PREAMBLE, false);
        assert_eq!(det.state(), ScanState::Locked);
        let det = feed(det, &[0x10; 4], true);
        assert!(!det.aligned());
        assert!(!det.flags().is_stable());
    }

    #[test]
    fn flags_sample_the_closing_byte_of_each_segment() {
        // Pixel level high only on bytes 1, 5 and 7.
        let mut det = PreambleDetector::new();
        for (i, byte) in EAV_PREAMBLE.iter().enumerate() {
            det = det.next(blank(*byte, i % 2 == 1));
        }
        assert!(det.flags().is_stable());

        let mut det = PreambleDetector::new();
        for (i, byte) in EAV_PREAMBLE.iter().enumerate() {
            det = det.next(blank(*byte, i % 2 == 0));
        }
        assert!(!det.flags().flag(0));
        assert!(!det.flags().flag(1));
        assert!(!det.flags().flag(2));
    }

    #[test]
    fn deviation_restarts_within_one_cycle() {
        for bad_at in 0..EAV_PREAMBLE.len() {
            let mut bytes = EAV_PREAMBLE;
            bytes[bad_at] = 0x42;
            let det = feed(PreambleDetector::new(), &bytes[..=bad_at], true);
            assert_eq!(det.state(), ScanState::First, "deviation at byte {bad_at}");
        }
    }

    #[test]
    fn line_valid_restarts_scan() {
        let det = feed(PreambleDetector::new(), &EAV_PREAMBLE[..4], true);
        assert_eq!(det.state(), ScanState::Second);
        let det = det.next(DetectorInputs {
            data: 0x00,
            lv: true,
            pixel_level: true,
        });
        assert_eq!(det.state(), ScanState::First);
        let det = feed(det, &EAV_PREAMBLE[..1], true);
        assert_eq!(det.state(), ScanState::First);
    }

    #[test]
    fn ff_breaking_partial_match_is_reused() {
        let bytes = [0xFF, 0xFF, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xB6, 0xB6];
        let det = feed(PreambleDetector::new(), &bytes[..4], true);
        assert_eq!(det.state(), ScanState::First);
        let det = feed(det, &bytes[4..], true);
        assert_eq!(det.state(), ScanState::Locked);
    }

    #[test]
    fn ff_in_status_segment_is_reused() {
        let bytes = [0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF];
        let det = feed(PreambleDetector::new(), &bytes, true);
        assert_eq!(det.state(), ScanState::First);
        let det = feed(det, &EAV_PREAMBLE[1..], true);
        assert_eq!(det.state(), ScanState::Locked);
    }

    #[test]
    fn status_bytes_match_on_high_nibble() {
        let bytes = [0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xB0, 0xBF];
        let det = feed(PreambleDetector::new(), &bytes, true);
        assert_eq!(det.state(), ScanState::Locked);
    }

    #[test]
    fn locked_survives_line_valid() {
        let det = feed(PreambleDetector::new(), &EAV_PREAMBLE, true);
        let det = det.next(DetectorInputs {
            data: 0x80,
            lv: true,
            pixel_level: false,
        });
        assert_eq!(det.state(), ScanState::Locked);
    }
}
