//! Argument values carried by deferred callbacks.

use std::fmt;

use serde::Serialize;


/// Largest number of positional arguments a single tick can carry.
pub const MAX_TICK_ARGS: usize = 3;

/// A scalar argument passed to a deferred callback.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Val {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Nil => write!(f, "nil"),
            Val::Bool(b) => write!(f, "{}", b),
            Val::Int(i) => write!(f, "{}", i),
            Val::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Inline argument pack for one tick.
///
/// Lives next to the callback in the queue slot, so scheduling never allocates
/// per call.
#[derive(Clone, Copy, PartialEq)]
pub struct TickArgs {
    len: u8,
    slots: [Val; MAX_TICK_ARGS],
}

impl TickArgs {
    pub const EMPTY: TickArgs = TickArgs {
        len: 0,
        slots: [Val::Nil; MAX_TICK_ARGS],
    };

    /// Build an argument pack at compile time. Panics (at const evaluation)
    /// when `N` exceeds [`MAX_TICK_ARGS`].
    pub const fn from_array<const N: usize>(values: [Val; N]) -> Self {
        assert!(N <= MAX_TICK_ARGS, "too many tick arguments");
        let mut slots = [Val::Nil; MAX_TICK_ARGS];
        let mut i = 0;
        while i < N {
            slots[i] = values[i];
            i += 1;
        }
        TickArgs { len: N as u8, slots }
    }

    #[inline]
    pub fn as_slice(&self) -> &[Val] {
        &self.slots[..self.len as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for TickArgs {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for TickArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl fmt::Display for TickArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, val) in self.as_slice().iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", val)?;
        }
        write!(f, ")")
    }
}
