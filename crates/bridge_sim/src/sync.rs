//! Clock-domain crossing primitives.

/// A two-stage flip-flop synchronizer.
///
/// Also used as the edge detector in front of the timing generator: the
/// first stage is the registered input and the second its delayed copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Synchronizer {
    stages: [bool; 2],
}

impl Synchronizer {
    /// The synchronized output (second stage).
    pub fn output(&self) -> bool {
        self.stages[1]
    }

    /// The first stage, i.e. the input registered once.
    pub fn registered(&self) -> bool {
        self.stages[0]
    }

    /// `stage0 & !stage1`: a rising edge was sampled on the previous cycle.
    pub fn rising(&self) -> bool {
        self.stages[0] && !self.stages[1]
    }

    /// Shifts `input` into the first stage.
    pub fn next(&self, input: bool) -> Self {
        Self {
            stages: [input, self.stages[0]],
        }
    }
}

/// An active-low reset synchronizer: asynchronous assert, synchronous release.
///
/// A fresh synchronizer holds its domain in reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResetSynchronizer {
    stages: [bool; 2],
}

impl ResetSynchronizer {
    /// `true` once the release has propagated through both stages.
    pub fn released(&self) -> bool {
        self.stages[1]
    }

    /// Asynchronously asserts reset, clearing both stages.
    pub fn assert(&mut self) {
        self.stages = [false, false];
    }

    /// Clocks the synchronizer with the raw active-low reset `rst_n`.
    pub fn next(&self, rst_n: bool) -> Self {
        if rst_n {
            Self {
                stages: [true, self.stages[0]],
            }
        } else {
            Self::default()
        }
    }
}

/// A set of `N` latched flags that is stable only when every flag is set.
///
/// The preamble detector latches one sample of the secondary clock per
/// preamble segment; the byte phase is trusted only when all agree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StableWindow<const N: usize> {
    flags: [bool; N],
}

impl<const N: usize> StableWindow<N> {
    /// A window with every flag clear.
    pub const CLEAR: Self = Self { flags: [false; N] };

    /// Returns a copy with flag `slot` set to `level`. Out-of-range slots are
    /// ignored.
    pub fn latch(&self, slot: usize, level: bool) -> Self {
        let mut flags = self.flags;
        if let Some(flag) = flags.get_mut(slot) {
            *flag = level;
        }
        Self { flags }
    }

    /// The value of one flag.
    pub fn flag(&self, slot: usize) -> bool {
        self.flags.get(slot).copied().unwrap_or(false)
    }

    /// `true` when every flag is set.
    pub fn is_stable(&self) -> bool {
        self.flags.iter().all(|f| *f)
    }
}

impl<const N: usize> Default for StableWindow<N> {
    fn default() -> Self {
        Self::CLEAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synchronizer_has_two_cycle_latency() {
        let s = Synchronizer::default();
        let s = s.next(true);
        assert!(s.registered());
        assert!(!s.output());
        let s = s.next(true);
        assert!(s.output());
    }

    #[test]
    fn synchronizer_stages_shift() {
        let s = Synchronizer::default().next(true).next(false);
        assert!(!s.registered());
        assert!(s.output());
        let s = s.next(false);
        assert!(!s.registered());
        assert!(!s.output());
    }

    #[test]
    fn synchronizer_rising_edge_lasts_one_cycle() {
        let s = Synchronizer::default().next(true);
        assert!(s.rising());
        let s = s.next(true);
        assert!(!s.rising());
        let s = s.next(false).next(true);
        assert!(s.rising());
    }

    #[test]
    fn reset_sync_starts_asserted() {
        assert!(!ResetSynchronizer::default().released());
    }

    #[test]
    fn reset_sync_releases_after_two_cycles() {
        let r = ResetSynchronizer::default().next(true);
        assert!(!r.released());
        let r = r.next(true);
        assert!(r.released());
    }

    #[test]
    fn reset_sync_asserts_immediately() {
        let mut r = ResetSynchronizer::default().next(true).next(true);
        r.assert();
        assert!(!r.released());

        let r = ResetSynchronizer::default().next(true).next(true).next(false);
        assert!(!r.released());
    }

    #[test]
    fn stable_window_requires_all_flags() {
        let w = StableWindow::<3>::CLEAR;
        let w = w.latch(0, true).latch(1, true);
        assert!(!w.is_stable());
        let w = w.latch(2, true);
        assert!(w.is_stable());
        let w = w.latch(1, false);
        assert!(!w.is_stable());
        assert!(!w.flag(1));
        assert!(w.flag(2));
    }

    #[test]
    fn stable_window_ignores_out_of_range() {
        let w = StableWindow::<2>::CLEAR.latch(5, true);
        assert_eq!(w, StableWindow::CLEAR);
        assert!(!w.flag(5));
    }
}
