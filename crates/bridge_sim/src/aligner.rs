//! Bit aligner: retries the byte phase until the detector reports alignment.
//!
//! While `n_align` is high the aligner counts housekeeping cycles and raises
//! a slip request every [`RETRY_PERIOD`] cycles. Each request toggles
//! `align_o` exactly once and pulses `detector_rst_o` for one cycle so the
//! detector rescans under the new phase.

/// Cycles between slip requests while alignment is still needed.
pub const RETRY_PERIOD: u8 = 5;

/// Registers of the bit aligner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BitAligner {
    count: u8,
    request: bool,
    detector_rst: bool,
    align_r: bool,
    align_o: bool,
}

impl BitAligner {
    /// An aligner in its reset state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retry counter.
    pub fn count(&self) -> u8 {
        self.count
    }

    /// The slip request register.
    pub fn request(&self) -> bool {
        self.request
    }

    /// Bit-slip toggle to the clock divider.
    pub fn align_o(&self) -> bool {
        self.align_o
    }

    /// Detector restart strobe.
    pub fn detector_rst(&self) -> bool {
        self.detector_rst
    }

    /// Computes the registers after one clock edge.
    pub fn next(&self, n_align: bool) -> Self {
        let (count, request) = if !n_align {
            (0, false)
        } else if self.count < RETRY_PERIOD {
            (self.count + 1, false)
        } else {
            (1, true)
        };

        // Falling edge of the registered request.
        let align_p = !self.request && self.align_r;

        Self {
            count,
            request,
            detector_rst: self.request,
            align_r: self.request,
            align_o: self.align_o ^ align_p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clocks `n` cycles with a constant input and returns every state.
    fn run(start: BitAligner, n_align: bool, n: usize) -> Vec<BitAligner> {
        std::iter::successors(Some(start), |a| Some(a.next(n_align)))
            .skip(1)
            .take(n)
            .collect()
    }

    #[test]
    fn request_follows_five_unaligned_cycles() {
        let states = run(BitAligner::new(), true, 6);
        for (i, s) in states[..5].iter().enumerate() {
            assert!(!s.request(), "early request at cycle {i}");
            assert_eq!(s.count(), i as u8 + 1);
        }
        assert!(states[5].request());
        assert_eq!(states[5].count(), 1);
    }

    #[test]
    fn one_toggle_and_one_strobe_per_request() {
        let states = run(BitAligner::new(), true, 12);
        // Requests at cycles 5 and 10 (0-based).
        let requests: Vec<usize> = (0..12).filter(|&i| states[i].request()).collect();
        assert_eq!(requests, vec![5, 10]);

        let strobes: Vec<usize> = (0..12).filter(|&i| states[i].detector_rst()).collect();
        assert_eq!(strobes, vec![6, 11]);

        let align: Vec<bool> = states.iter().map(|s| s.align_o()).collect();
        assert!(!align[6]);
        assert!(align[7]);
        assert!(align[10]);
        assert!(align[11]);
    }

    #[test]
    fn aligned_clears_counter_within_one_cycle() {
        let states = run(BitAligner::new(), true, 3);
        let next = states[2].next(false);
        assert_eq!(next.count(), 0);
        assert!(!next.request());
    }

    #[test]
    fn aligned_input_never_requests() {
        let states = run(BitAligner::new(), false, 20);
        assert!(states.iter().all(|s| !s.request() && !s.detector_rst()));
        assert!(states.iter().all(|s| !s.align_o()));
    }

    #[test]
    fn request_in_flight_completes_after_alignment() {
        let states = run(BitAligner::new(), true, 6);
        assert!(states[5].request());
        let a = states[5].next(false);
        assert!(a.detector_rst());
        let a = a.next(false);
        assert!(a.align_o());
        assert!(!a.detector_rst());
    }
}
