//! Single-threaded tick queue.

use std::collections::VecDeque;

use anyhow::Result;

use super::{Callback, QueueStats, Scheduler, SchedulerKind, Tick, TickId};
use crate::val::TickArgs;

/// FIFO tick queue drained in place by its owner.
#[derive(Debug)]
pub struct TickQueue<C: 'static> {
    ticks: VecDeque<Tick<C>>,
    next_id: TickId,
    invoked: u64,
}

impl<C: 'static> Default for TickQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> TickQueue<C> {
    pub fn new() -> Self {
        TickQueue {
            ticks: VecDeque::new(),
            next_id: 0,
            invoked: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TickQueue {
            ticks: VecDeque::with_capacity(capacity),
            next_id: 0,
            invoked: 0,
        }
    }

    /// Invoke only the oldest tick, if any.
    pub fn run_one(&mut self, ctx: &mut C) -> Result<bool> {
        match self.ticks.pop_front() {
            Some(tick) => {
                let id = self.invoked;
                self.invoked += 1;
                tick.invoke(ctx, id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<C: 'static> Scheduler<C> for TickQueue<C> {
    fn kind(&self) -> SchedulerKind {
        SchedulerKind::Queue
    }

    #[inline]
    fn defer(&mut self, callback: &'static Callback<C>, args: TickArgs) -> Result<TickId> {
        let tick = Tick::new(callback, args)?;
        let id = self.next_id;
        self.next_id += 1;
        self.ticks.push_back(tick);
        Ok(id)
    }

    fn pending(&self) -> usize {
        self.ticks.len()
    }

    fn run_pending(&mut self, ctx: &mut C) -> Result<u64> {
        let start = self.invoked;
        while self.run_one(ctx)? {}
        Ok(self.invoked - start)
    }

    fn stats(&self) -> QueueStats {
        QueueStats {
            scheduled: self.next_id,
            invoked: self.invoked,
            pending: self.ticks.len(),
        }
    }
}
