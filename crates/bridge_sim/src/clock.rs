//! Multi-domain clock scheduler.
//!
//! Each independently driven clock domain has a fixed period. The scheduler
//! keeps a min-heap of pending rising edges and always yields the earliest
//! one; edges at the same instant are ordered by [`Domain`] so runs are
//! deterministic. Derived clocks (the divided pixel clock) are not scheduled
//! here: they tick inside the domain that produces them.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use bridge_common::Frequency;

use crate::time::SimTime;

/// An independently driven clock domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Domain {
    /// The byte clock recovered from the deserializer.
    Sys,
    /// The low-frequency housekeeping oscillator.
    Housekeeping,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Sys => write!(f, "sys"),
            Domain::Housekeeping => write!(f, "hk"),
        }
    }
}

/// A scheduled rising edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockEdge {
    /// When the edge occurs.
    pub time: SimTime,
    /// Which domain it belongs to.
    pub domain: Domain,
}

#[derive(Clone, Copy, Debug)]
struct ClockDef {
    domain: Domain,
    period_fs: u64,
}

/// Min-heap scheduler over the free-running clock domains.
#[derive(Debug)]
pub struct ClockScheduler {
    clocks: Vec<ClockDef>,
    pending: BinaryHeap<Reverse<ClockEdge>>,
}

impl ClockScheduler {
    /// Creates a scheduler with no clocks.
    pub fn new() -> Self {
        Self {
            clocks: Vec::new(),
            pending: BinaryHeap::new(),
        }
    }

    /// Adds a clock whose first rising edge is one full period after time zero.
    pub fn add_clock(&mut self, domain: Domain, frequency: Frequency) {
        let period_fs = frequency.period_fs();
        self.clocks.push(ClockDef { domain, period_fs });
        self.pending.push(Reverse(ClockEdge {
            time: SimTime::from_fs(period_fs),
            domain,
        }));
    }

    /// Returns the period of a domain in femtoseconds, if it is scheduled.
    pub fn period_fs(&self, domain: Domain) -> Option<u64> {
        self.clocks
            .iter()
            .find(|c| c.domain == domain)
            .map(|c| c.period_fs)
    }

    /// Returns the next edge without consuming it.
    pub fn peek(&self) -> Option<ClockEdge> {
        self.pending.peek().map(|Reverse(edge)| *edge)
    }

    /// Pops the earliest edge and schedules that domain's following edge.
    pub fn next_edge(&mut self) -> Option<ClockEdge> {
        let Reverse(edge) = self.pending.pop()?;
        if let Some(period_fs) = self.period_fs(edge.domain) {
            self.pending.push(Reverse(ClockEdge {
                time: edge.time.after(period_fs),
                domain: edge.domain,
            }));
        }
        Some(edge)
    }
}

impl Default for ClockScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hz(v: u64) -> Frequency {
        Frequency::from_hz(v).unwrap()
    }

    #[test]
    fn empty_scheduler_has_no_edges() {
        let mut s = ClockScheduler::new();
        assert!(s.peek().is_none());
        assert!(s.next_edge().is_none());
    }

    #[test]
    fn single_clock_is_periodic() {
        let mut s = ClockScheduler::new();
        s.add_clock(Domain::Sys, hz(1_000_000)); // 1 us
        let times: Vec<u64> = (0..3).map(|_| s.next_edge().unwrap().time.fs).collect();
        assert_eq!(times, vec![1_000_000_000, 2_000_000_000, 3_000_000_000]);
    }

    #[test]
    fn interleaves_two_domains() {
        let mut s = ClockScheduler::new();
        s.add_clock(Domain::Sys, hz(4_000_000)); // 250 ns
        s.add_clock(Domain::Housekeeping, hz(1_000_000)); // 1 us
        let order: Vec<Domain> = (0..10).map(|_| s.next_edge().unwrap().domain).collect();
        let hk = order.iter().filter(|d| **d == Domain::Housekeeping).count();
        assert_eq!(hk, 2);
        // At t = 1 us both domains have an edge; sys is ordered first.
        assert_eq!(order[3], Domain::Sys);
        assert_eq!(order[4], Domain::Housekeeping);
    }

    #[test]
    fn period_lookup() {
        let mut s = ClockScheduler::new();
        s.add_clock(Domain::Housekeeping, hz(10_000));
        assert_eq!(s.period_fs(Domain::Housekeeping), Some(100_000_000_000));
        assert_eq!(s.period_fs(Domain::Sys), None);
    }

    #[test]
    fn domain_display() {
        assert_eq!(Domain::Sys.to_string(), "sys");
        assert_eq!(Domain::Housekeeping.to_string(), "hk");
    }
}
