use std::fmt;

use anyhow::{Result, bail};

use crate::val::{TickArgs, Val};

/// Callback body. Receives the owner's state and the tick's arguments.
pub type TickFn<C> = fn(ctx: &mut C, args: &[Val]) -> Result<()>;

/// A named callback with a declared arity.
///
/// Callbacks are meant to live in `static`s so a queued tick only holds a
/// reference to them.
pub struct Callback<C> {
    name: &'static str,
    arity: usize,
    func: TickFn<C>,
}

impl<C> Callback<C> {
    pub const fn new(name: &'static str, arity: usize, func: TickFn<C>) -> Self {
        Callback { name, arity, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn func(&self) -> TickFn<C> {
        self.func
    }

    pub(crate) fn check_arity(&self, args: &TickArgs) -> Result<()> {
        if args.len() != self.arity {
            bail!(
                "{} expects {} argument(s), got {}",
                self.name,
                self.arity,
                args.len()
            );
        }
        Ok(())
    }
}

impl<C> fmt::Debug for Callback<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}
