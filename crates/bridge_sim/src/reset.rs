//! Power-up reset sequencer on the housekeeping clock.

use bridge_config::ResetPolicy;

/// Holds the main reset after power-up, then releases it, and toggles a
/// heartbeat at a fixed period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetSequencer {
    policy: ResetPolicy,
    hold_count: u32,
    beat_count: u32,
    released: bool,
    heartbeat: bool,
}

impl ResetSequencer {
    /// A sequencer at power-up: reset asserted, heartbeat low.
    pub fn new(policy: ResetPolicy) -> Self {
        Self {
            policy,
            hold_count: 0,
            beat_count: 0,
            released: false,
            heartbeat: false,
        }
    }

    /// Active-low main reset: `true` once released.
    pub fn rst_n(&self) -> bool {
        self.released
    }

    /// Heartbeat output.
    pub fn heartbeat(&self) -> bool {
        self.heartbeat
    }

    /// Computes the registers after one housekeeping clock edge.
    ///
    /// `button` is the raw reset button level; it is ignored unless the
    /// policy wires a button.
    pub fn next(&self, button: bool) -> Self {
        let mut next = *self;

        next.beat_count += 1;
        let beat = next.beat_count >= self.policy.heartbeat_ticks;
        if beat {
            next.beat_count = 0;
            next.heartbeat = !self.heartbeat;
        }

        if self.policy.button && button {
            next.released = false;
            next.hold_count = 0;
        } else if !self.released {
            if self.policy.release_on_heartbeat {
                next.released = beat;
            } else {
                next.hold_count += 1;
                next.released = next.hold_count >= self.policy.hold_ticks;
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(hold_ticks: u32, heartbeat_ticks: u32) -> ResetPolicy {
        ResetPolicy {
            hold_ticks,
            heartbeat_ticks,
            release_on_heartbeat: false,
            button: false,
        }
    }

    fn clock(mut seq: ResetSequencer, n: usize, button: bool) -> ResetSequencer {
        for _ in 0..n {
            seq = seq.next(button);
        }
        seq
    }

    #[test]
    fn holds_then_releases() {
        let seq = ResetSequencer::new(policy(3, 100));
        assert!(!seq.rst_n());
        let seq = clock(seq, 2, false);
        assert!(!seq.rst_n());
        let seq = clock(seq, 1, false);
        assert!(seq.rst_n());
        let seq = clock(seq, 50, false);
        assert!(seq.rst_n());
    }

    #[test]
    fn heartbeat_toggles_each_period() {
        let seq = ResetSequencer::new(policy(1, 4));
        let seq = clock(seq, 3, false);
        assert!(!seq.heartbeat());
        let seq = clock(seq, 1, false);
        assert!(seq.heartbeat());
        let seq = clock(seq, 4, false);
        assert!(!seq.heartbeat());
    }

    #[test]
    fn release_on_heartbeat() {
        let p = ResetPolicy {
            release_on_heartbeat: true,
            ..policy(0, 5)
        };
        let seq = clock(ResetSequencer::new(p), 4, false);
        assert!(!seq.rst_n());
        let seq = clock(seq, 1, false);
        assert!(seq.rst_n());
        assert!(seq.heartbeat());
    }

    #[test]
    fn button_rearms_hold() {
        let p = ResetPolicy {
            button: true,
            ..policy(2, 100)
        };
        let seq = clock(ResetSequencer::new(p), 2, false);
        assert!(seq.rst_n());
        let seq = clock(seq, 3, true);
        assert!(!seq.rst_n());
        let seq = clock(seq, 1, false);
        assert!(!seq.rst_n());
        let seq = clock(seq, 1, false);
        assert!(seq.rst_n());
    }

    #[test]
    fn unwired_button_is_ignored() {
        let seq = clock(ResetSequencer::new(policy(1, 100)), 1, false);
        let seq = clock(seq, 5, true);
        assert!(seq.rst_n());
    }
}
