//! Start/end lifecycle around the timed region of a benchmark.

use std::time::{Duration, Instant};

use anyhow::{Result, bail};

/// Result of one timed region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Operations reported to `end`, in the benchmark's own unit.
    pub operations: f64,
    pub elapsed: Duration,
    /// `operations` per elapsed second.
    pub rate: f64,
}

/// Single-use timer: one `start`, one `end`.
#[derive(Debug, Default)]
pub struct Harness {
    started_at: Option<Instant>,
    ended: bool,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) -> Result<()> {
        if self.started_at.is_some() {
            bail!("called start() multiple times");
        }
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Stop the clock and derive the rate. Elapsed time is floored at one
    /// nanosecond so the rate stays finite.
    pub fn end(&mut self, operations: f64) -> Result<Sample> {
        let Some(started_at) = self.started_at else {
            bail!("called end() without start()");
        };
        if self.ended {
            bail!("called end() multiple times");
        }
        if !operations.is_finite() || operations < 0.0 {
            bail!("called end() with invalid operation count {}", operations);
        }
        self.ended = true;

        let elapsed = started_at.elapsed().max(Duration::from_nanos(1));
        Ok(Sample {
            operations,
            elapsed,
            rate: operations / elapsed.as_secs_f64(),
        })
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && !self.ended
    }
}
