//! Countdown latch with single-fire completion.

use anyhow::{Result, bail};

/// Counts expected completions down to zero.
///
/// [`count_down`](Self::count_down) returns `true` on exactly one call: the
/// one that takes the count to zero. A latch created with zero is already
/// fired and never reports a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownLatch {
    target: u64,
    remaining: u64,
}

impl CountdownLatch {
    pub fn new(target: u64) -> Self {
        CountdownLatch {
            target,
            remaining: target,
        }
    }

    /// Record one completion. Counting past zero means some work was
    /// delivered twice and is reported as an error.
    #[inline]
    pub fn count_down(&mut self) -> Result<bool> {
        if self.remaining == 0 {
            bail!(
                "countdown latch overrun: {} completions expected, received more",
                self.target
            );
        }
        self.remaining -= 1;
        Ok(self.remaining == 0)
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// Completions recorded so far.
    pub fn completed(&self) -> u64 {
        self.target - self.remaining
    }
}
