//! This module contains [`Suspend`] and the awaiter protocol ([`Awaiter`], [`IntoAwaiter`]).
//! This module is used for low-level work with the driver.
//! Please use [`co_await!`](crate::co_await) if it is possible.
use std::fmt::{self, Debug};
use crate::coroutine::handle::{FrameRef, Resumer};

/// The request a task body yields to the driver when it suspends.
///
/// It is the one way for a task body to communicate with the driver.
pub enum Suspend {
    /// Symmetric transfer: resume the awaited task in place of the current one.
    /// The awaited task resumes the current one when it finishes.
    Transfer(FrameRef),

    /// The current coroutine stays suspended and the [`Resumer`] is passed to the function.
    /// Whoever gets the resumer is responsible for resuming the coroutine.
    Park(Box<dyn FnOnce(Resumer) + Send>),
}

impl Suspend {
    /// Create a Suspend variant [`Park`](Suspend::Park).
    pub fn park<F: FnOnce(Resumer) + Send + 'static>(schedule: F) -> Self {
        Suspend::Park(Box::new(schedule))
    }
}

impl Debug for Suspend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suspend::Transfer(frame) => f.debug_tuple("Transfer").field(frame).finish(),
            Suspend::Park(_) => f.write_str("Park"),
        }
    }
}

/// A value that can be awaited once from a task body.
///
/// `co_await!(awaiter)` calls [`is_ready`](Awaiter::is_ready); if it returns `false`, yields
/// the result of [`suspend`](Awaiter::suspend) to the driver. After that, or right away if it
/// was ready, [`resume`](Awaiter::resume) produces the value of the `co_await!` expression.
pub trait Awaiter {
    /// The type of the awaited value.
    type Output;

    /// Returns `true` if the value is available without suspending.
    fn is_ready(&self) -> bool;

    /// Called just before the awaiting coroutine suspends.
    fn suspend(&mut self) -> Suspend;

    /// Produces the value, or resumes the panic the awaited computation captured.
    fn resume(self) -> Self::Output;
}

/// Conversion into an [`Awaiter`]. Consumes the value, so everything can be awaited only once.
pub trait IntoAwaiter {
    /// The type of the awaited value.
    type Output;
    /// The awaiter that produces it.
    type Awaiter: Awaiter<Output = Self::Output>;

    fn into_awaiter(self) -> Self::Awaiter;
}

/// An awaitable that is always ready: awaiting it never suspends.
#[derive(Debug)]
pub struct Ready<T>(T);

/// Creates an awaitable that produces `value` without suspending.
pub fn ready<T>(value: T) -> Ready<T> {
    Ready(value)
}

impl<T> Awaiter for Ready<T> {
    type Output = T;

    fn is_ready(&self) -> bool {
        true
    }

    fn suspend(&mut self) -> Suspend {
        unreachable!("a ready awaiter never suspends")
    }

    fn resume(self) -> T {
        self.0
    }
}

impl<T> IntoAwaiter for Ready<T> {
    type Output = T;
    type Awaiter = Self;

    fn into_awaiter(self) -> Self {
        self
    }
}
