//! Divide-by-two clock divider with bit-slip control.
//!
//! The divided clock toggles on every byte clock edge. A change on the
//! (synchronized) align input holds it for one edge instead, which shifts the
//! pixel clock by one byte relative to the stream.

/// Registers of the clock divider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockDivider {
    level: bool,
    align_prev: bool,
}

impl ClockDivider {
    /// A divider whose output starts at `initial_level`.
    pub fn new(initial_level: bool) -> Self {
        Self {
            level: initial_level,
            align_prev: false,
        }
    }

    /// Current level of the divided clock.
    pub fn level(&self) -> bool {
        self.level
    }

    /// Computes the registers after one byte clock edge.
    ///
    /// Reset clears the slip history but leaves the clock running.
    pub fn next(&self, align: bool, reset: bool) -> Self {
        if reset {
            return Self {
                level: !self.level,
                align_prev: false,
            };
        }
        if align != self.align_prev {
            Self {
                level: self.level,
                align_prev: align,
            }
        } else {
            Self {
                level: !self.level,
                align_prev: self.align_prev,
            }
        }
    }

    /// Whether going from `self` to `next` is a rising edge of the divided clock.
    pub fn rises_to(&self, next: &Self) -> bool {
        !self.level && next.level
    }
}
