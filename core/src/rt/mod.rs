//! Deferred-callback scheduling.
//!
//! A tick is a callback plus its arguments, queued now and invoked later when
//! the owner drains the queue. Every backend follows the same contract:
//!
//! - ticks are delivered in FIFO order relative to `defer`,
//! - each tick is delivered exactly once,
//! - nothing runs inside `defer`; ticks run on the draining thread, one at a
//!   time, synchronously,
//! - a failing callback stops the drain and leaves the remaining ticks queued.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::val::TickArgs;

mod callback;
pub mod channel;
pub mod latch;
pub mod queue;
pub mod runtime;

pub use callback::{Callback, TickFn};
pub use channel::{ChannelTickQueue, TickSender};
pub use latch::CountdownLatch;
pub use queue::TickQueue;
pub use runtime::{Runtime, RuntimeFlavor};

#[cfg(test)]
mod channel_test;

/// Sequence number assigned to a tick by `defer`.
pub type TickId = u64;

/// One queued unit of work.
pub struct Tick<C: 'static> {
    pub(crate) callback: &'static Callback<C>,
    pub(crate) args: TickArgs,
}

impl<C: 'static> Tick<C> {
    pub(crate) fn new(callback: &'static Callback<C>, args: TickArgs) -> Result<Self> {
        callback.check_arity(&args)?;
        Ok(Tick { callback, args })
    }

    #[inline]
    pub(crate) fn invoke(self, ctx: &mut C, id: TickId) -> Result<()> {
        (self.callback.func())(ctx, self.args.as_slice())
            .map_err(|e| anyhow!("tick #{} ({}) failed: {}", id, self.callback.name(), e))
    }
}

impl<C: 'static> fmt::Debug for Tick<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.callback.name(), self.args)
    }
}

/// Counters shared by every backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub scheduled: u64,
    pub invoked: u64,
    pub pending: usize,
}

/// A deferred-callback scheduler owned by a single draining thread.
pub trait Scheduler<C: 'static> {
    fn kind(&self) -> SchedulerKind;

    /// Queue `callback` with `args`. The argument count must equal the
    /// callback's declared arity.
    fn defer(&mut self, callback: &'static Callback<C>, args: TickArgs) -> Result<TickId>;

    /// Ticks queued but not yet invoked.
    fn pending(&self) -> usize;

    /// Invoke queued ticks in FIFO order until the queue is empty. Returns the
    /// number of ticks invoked by this call.
    fn run_pending(&mut self, ctx: &mut C) -> Result<u64>;

    fn stats(&self) -> QueueStats;
}

/// Available scheduler backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    /// Single-threaded `VecDeque`
    #[default]
    Queue,
    /// tokio unbounded mpsc channel
    Channel,
}

impl SchedulerKind {
    pub const ALL: [SchedulerKind; 2] = [SchedulerKind::Queue, SchedulerKind::Channel];

    pub fn label(self) -> &'static str {
        match self {
            SchedulerKind::Queue => "queue",
            SchedulerKind::Channel => "channel",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SchedulerKind::Queue => "single-threaded VecDeque drained in place",
            SchedulerKind::Channel => "tokio unbounded mpsc channel with Send producer handles",
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SchedulerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(SchedulerKind::Queue),
            "channel" => Ok(SchedulerKind::Channel),
            other => Err(anyhow!("unknown scheduler backend '{}' (expected queue or channel)", other)),
        }
    }
}
