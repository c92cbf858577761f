//! tokio-backed tick queue.
//!
//! Producers hold [`TickSender`] handles, which are `Send` and can be cloned
//! onto other threads or tasks. Ticks always run on the thread that owns the
//! [`ChannelTickQueue`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;
use tracing::trace;

use super::{Callback, QueueStats, Scheduler, SchedulerKind, Tick, TickId};
use crate::val::TickArgs;

/// Ticks invoked between cooperative yields in [`ChannelTickQueue::run_until`].
pub const YIELD_INTERVAL: u64 = 1024;

#[derive(Debug, Default)]
struct Counters {
    next_id: AtomicU64,
    pending: AtomicUsize,
}

/// Producer handle for a [`ChannelTickQueue`].
pub struct TickSender<C: 'static> {
    sender: mpsc::UnboundedSender<Tick<C>>,
    counters: Arc<Counters>,
}

impl<C: 'static> Clone for TickSender<C> {
    fn clone(&self) -> Self {
        TickSender {
            sender: self.sender.clone(),
            counters: self.counters.clone(),
        }
    }
}

impl<C: 'static> fmt::Debug for TickSender<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickSender")
            .field("pending", &self.counters.pending.load(Ordering::Relaxed))
            .finish()
    }
}

impl<C: 'static> TickSender<C> {
    /// Queue a tick from any thread.
    pub fn defer(&self, callback: &'static Callback<C>, args: TickArgs) -> Result<TickId> {
        let tick = Tick::new(callback, args)?;
        // Ids are unique across producers; FIFO holds per producer.
        let id = self.counters.next_id.fetch_add(1, Ordering::Relaxed);
        self.counters.pending.fetch_add(1, Ordering::Relaxed);
        if self.sender.send(tick).is_err() {
            self.counters.pending.fetch_sub(1, Ordering::Relaxed);
            return Err(anyhow!("tick queue is closed"));
        }
        Ok(id)
    }
}

/// Owner side of the channel backend.
pub struct ChannelTickQueue<C: 'static> {
    sender: TickSender<C>,
    receiver: mpsc::UnboundedReceiver<Tick<C>>,
    invoked: u64,
}

impl<C: 'static> Default for ChannelTickQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> fmt::Debug for ChannelTickQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelTickQueue").field("stats", &self.stats()).finish()
    }
}

impl<C: 'static> ChannelTickQueue<C> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        ChannelTickQueue {
            sender: TickSender {
                sender,
                counters: Arc::new(Counters::default()),
            },
            receiver,
            invoked: 0,
        }
    }

    /// A producer handle for this queue.
    pub fn sender(&self) -> TickSender<C> {
        self.sender.clone()
    }

    #[inline]
    fn invoke(&mut self, tick: Tick<C>, ctx: &mut C) -> Result<()> {
        self.sender.counters.pending.fetch_sub(1, Ordering::Relaxed);
        let id = self.invoked;
        self.invoked += 1;
        tick.invoke(ctx, id)
    }

    /// Event-loop style drain: invoke ticks until `done` reports completion,
    /// waiting for producers whenever the queue is empty.
    ///
    /// `done` is checked before every tick. The loop yields to the runtime
    /// every [`YIELD_INTERVAL`] ticks so it can be cancelled by a timeout.
    /// With no producer ever delivering the missing ticks this never returns;
    /// bound it with [`super::Runtime::block_on_timeout`].
    pub async fn run_until<F>(&mut self, ctx: &mut C, mut done: F) -> Result<u64>
    where
        F: FnMut(&C) -> bool,
    {
        let start = self.invoked;
        loop {
            if done(ctx) {
                return Ok(self.invoked - start);
            }
            let tick = match self.receiver.try_recv() {
                Ok(tick) => tick,
                Err(mpsc::error::TryRecvError::Empty) => {
                    trace!(invoked = self.invoked - start, "tick queue idle, waiting for producers");
                    self.receiver
                        .recv()
                        .await
                        .ok_or_else(|| anyhow!("tick queue is closed"))?
                }
                Err(mpsc::error::TryRecvError::Disconnected) => return Err(anyhow!("tick queue is closed")),
            };
            self.invoke(tick, ctx)?;
            if (self.invoked - start) % YIELD_INTERVAL == 0 {
                tokio::task::yield_now().await;
            }
        }
    }
}

impl<C: 'static> Scheduler<C> for ChannelTickQueue<C> {
    fn kind(&self) -> SchedulerKind {
        SchedulerKind::Channel
    }

    #[inline]
    fn defer(&mut self, callback: &'static Callback<C>, args: TickArgs) -> Result<TickId> {
        self.sender.defer(callback, args)
    }

    fn pending(&self) -> usize {
        self.sender.counters.pending.load(Ordering::Relaxed)
    }

    fn run_pending(&mut self, ctx: &mut C) -> Result<u64> {
        let start = self.invoked;
        while let Ok(tick) = self.receiver.try_recv() {
            self.invoke(tick, ctx)?;
        }
        Ok(self.invoked - start)
    }

    fn stats(&self) -> QueueStats {
        QueueStats {
            scheduled: self.sender.counters.next_id.load(Ordering::Relaxed),
            invoked: self.invoked,
            pending: self.pending(),
        }
    }
}
