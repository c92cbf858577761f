//! Breadth-args benchmark: `N` ticks queued up front, with 3, 2 or 1
//! arguments in a fixed round-robin, then drained.
//!
//! Index `i` gets `cb3(512, true, nil)` when `i % 3 == 0`, otherwise
//! `cb2(false, 5.1)` when `i % 2 == 0`, otherwise `cb1(0)`. The clock stops
//! inside the callback that completes the `N`th tick.

use std::hint::black_box;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde::Serialize;
use tracing::debug;

use super::harness::{Harness, Sample};
use crate::rt::{Callback, ChannelTickQueue, CountdownLatch, Runtime, Scheduler, SchedulerKind};
use crate::val::{TickArgs, Val};

pub const BENCH_NAME: &str = "process/next-tick-breadth-args";

const OPS_PER_MILLION: f64 = 1e6;

// Largest tick count accepted from configuration. Every tick is queued before
// the drain starts, at roughly 64 bytes each, so this caps the queue near 6 GiB.
pub const MAX_TICKS: u64 = 100_000_000;

const ARGS1: TickArgs = TickArgs::from_array([Val::Int(0)]);
const ARGS2: TickArgs = TickArgs::from_array([Val::Bool(false), Val::Float(5.1)]);
const ARGS3: TickArgs = TickArgs::from_array([Val::Int(512), Val::Bool(true), Val::Nil]);

static CB1: Callback<BreadthState> = Callback::new("cb1", 1, cb1);
static CB2: Callback<BreadthState> = Callback::new("cb2", 2, cb2);
static CB3: Callback<BreadthState> = Callback::new("cb3", 3, cb3);

/// Tallies per callback arity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArityCounts {
    pub one: u64,
    pub two: u64,
    pub three: u64,
}

impl ArityCounts {
    /// Counts the round-robin produces for `n` ticks.
    pub fn expected(n: u64) -> Self {
        // Indices below `n` congruent to `r` mod 6.
        let residue = |r: u64| (n + 5 - r) / 6;
        ArityCounts {
            one: residue(1) + residue(5),
            two: residue(2) + residue(4),
            three: residue(0) + residue(3),
        }
    }

    #[inline]
    pub fn record(&mut self, arity: usize) {
        match arity {
            1 => self.one += 1,
            2 => self.two += 1,
            _ => self.three += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.one + self.two + self.three
    }
}

/// Arity scheduled at index `i`.
#[inline]
pub fn arity_for(i: u64) -> usize {
    if i % 3 == 0 {
        3
    } else if i % 2 == 0 {
        2
    } else {
        1
    }
}

/// `N = millions × 1e6`. Rejects values that are negative, non-finite or do
/// not produce a whole number of ticks.
pub fn target_count(millions: f64) -> Result<u64> {
    if !millions.is_finite() || millions < 0.0 {
        bail!("millions must be a non-negative number, got {}", millions);
    }
    let exact = millions * OPS_PER_MILLION;
    let rounded = exact.round();
    if (exact - rounded).abs() > 1e-6 {
        bail!(
            "millions={} gives {} ticks; it must give a whole number of ticks",
            millions,
            exact
        );
    }
    if rounded > MAX_TICKS as f64 {
        bail!("millions={} exceeds the limit of {} ticks", millions, MAX_TICKS);
    }
    Ok(rounded as u64)
}

/// Per-run state handed to every callback.
#[derive(Debug)]
pub struct BreadthState {
    latch: CountdownLatch,
    harness: Harness,
    invoked: ArityCounts,
    sample: Option<Sample>,
}

impl BreadthState {
    fn new(n: u64) -> Self {
        BreadthState {
            latch: CountdownLatch::new(n),
            harness: Harness::new(),
            invoked: ArityCounts::default(),
            sample: None,
        }
    }

    #[inline]
    fn complete(&mut self, arity: usize) -> Result<()> {
        self.invoked.record(arity);
        if self.latch.count_down()? {
            let n = self.latch.completed();
            self.sample = Some(self.harness.end(n as f64 / OPS_PER_MILLION)?);
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.sample.is_some()
    }

    /// Callbacks completed so far.
    pub fn completed(&self) -> u64 {
        self.latch.completed()
    }
}

fn cb1(state: &mut BreadthState, args: &[Val]) -> Result<()> {
    black_box(args);
    state.complete(1)
}

fn cb2(state: &mut BreadthState, args: &[Val]) -> Result<()> {
    black_box(args);
    state.complete(2)
}

fn cb3(state: &mut BreadthState, args: &[Val]) -> Result<()> {
    black_box(args);
    state.complete(3)
}

/// One finished benchmark run
#[derive(Debug, Clone)]
pub struct BreadthOutcome {
    pub backend: SchedulerKind,
    pub millions: f64,
    pub n: u64,
    pub sample: Sample,
    pub scheduled: ArityCounts,
    pub invoked: ArityCounts,
}

fn begin(millions: f64) -> Result<(u64, BreadthState)> {
    let n = target_count(millions)?;
    let mut state = BreadthState::new(n);
    state.harness.start()?;
    if n == 0 {
        state.sample = Some(state.harness.end(0.0)?);
    }
    Ok((n, state))
}

fn schedule_all<S: Scheduler<BreadthState>>(scheduler: &mut S, n: u64) -> Result<ArityCounts> {
    let mut scheduled = ArityCounts::default();
    for i in 0..n {
        let (callback, args) = match arity_for(i) {
            3 => (&CB3, ARGS3),
            2 => (&CB2, ARGS2),
            _ => (&CB1, ARGS1),
        };
        scheduler.defer(callback, args)?;
        scheduled.record(callback.arity());
    }
    debug!(backend = %scheduler.kind(), n, pending = scheduler.pending(), "ticks scheduled");
    Ok(scheduled)
}

fn finish<S: Scheduler<BreadthState>>(
    scheduler: &S,
    millions: f64,
    n: u64,
    scheduled: ArityCounts,
    state: BreadthState,
) -> Result<BreadthOutcome> {
    let Some(sample) = state.sample else {
        return Err(anyhow!(
            "scheduler went idle after {} of {} callbacks",
            state.latch.completed(),
            state.latch.target()
        ));
    };
    let leftover = scheduler.pending();
    if leftover > 0 {
        bail!("{} ticks still queued after all {} callbacks completed", leftover, n);
    }
    debug!(backend = %scheduler.kind(), n, elapsed = ?sample.elapsed, "ticks drained");
    Ok(BreadthOutcome {
        backend: scheduler.kind(),
        millions,
        n,
        sample,
        scheduled,
        invoked: state.invoked,
    })
}

/// Run the benchmark once on `scheduler`, draining with `run_pending`.
///
/// An idle queue before the `N`th completion is reported as a stall.
pub fn run<S: Scheduler<BreadthState>>(scheduler: &mut S, millions: f64) -> Result<BreadthOutcome> {
    let (n, mut state) = begin(millions)?;
    let scheduled = schedule_all(scheduler, n)?;
    scheduler.run_pending(&mut state)?;
    finish(&*scheduler, millions, n, scheduled, state)
}

/// Run the benchmark once on the channel backend, draining with the
/// event-loop style [`ChannelTickQueue::run_until`] under an optional
/// timeout.
pub fn run_bounded(
    queue: &mut ChannelTickQueue<BreadthState>,
    runtime: &Runtime,
    millions: f64,
    timeout: Option<Duration>,
) -> Result<BreadthOutcome> {
    let (n, mut state) = begin(millions)?;
    let scheduled = schedule_all(queue, n)?;
    let drained = runtime.block_on_timeout(queue.run_until(&mut state, BreadthState::is_complete), timeout);
    if let Err(err) = drained {
        bail!("{} ({} of {} callbacks completed)", err, state.completed(), n);
    }
    finish(&*queue, millions, n, scheduled, state)
}
