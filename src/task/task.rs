//! This module contains [`Task`], a lazily started, single-owner asynchronous computation.
use std::fmt::{self, Debug};
use std::ops::Coroutine;
use std::sync::Arc;
use tracing::trace;
use crate::coroutine::frame::{self, Frame, Resume};
use crate::coroutine::{FrameRef, Handle, Suspend};
use crate::result::{Panic, Slot};

/// A lazily started asynchronous computation that produces a `T`.
///
/// A task is created suspended: no code of its body runs until it is started,
/// either by being awaited from another task with [`co_await!`](crate::co_await),
/// by [`blocking_wait`](crate::blocking_wait), or directly by [`start`](Task::start).
///
/// The body may await other tasks and [`offload`](crate::offload()) blocking work.
/// A panic in the body doesn't unwind through whoever resumed it; it is stored and raised
/// again by the first read of the result.
///
/// A task has exactly one consumer, so it can't be copied, and awaiting it or reading its
/// result consumes it.
///
/// Dropping a task is allowed at any point. A suspended body is not resumed anymore, even if
/// the task is parked on another thread, and its state is released by whichever thread holds
/// the frame last. A chain of awaiting tasks of any depth is torn down iteratively.
///
/// # Example
///
/// ```ignore
/// use cotask::{co_await, offload, task, blocking_wait};
///
/// #[task]
/// fn answer() -> i32 {
///     let half = co_await!(offload(|| 21));
///     half * 2
/// }
///
/// #[task]
/// fn print_answer() {
///     let answer = co_await!(answer());
///     println!("{answer}");
/// }
///
/// fn main() {
///     blocking_wait(print_answer());
/// }
/// ```
pub struct Task<T: 'static> {
    handle: Handle<T>,
}

impl<T: Send + 'static> Task<T> {
    /// Creates a suspended task from the body coroutine.
    /// The body yields [`Suspend`] requests, usually written with [`co_await!`](crate::co_await).
    pub fn new<C>(body: C) -> Self
    where
        C: Coroutine<Yield = Suspend, Return = T> + Send + 'static,
    {
        Self {
            handle: Handle::new(Frame::new(Box::pin(body))),
        }
    }

    /// Returns `true` once the body has returned or panicked.
    ///
    /// It may be called while the task runs on another thread.
    #[inline(always)]
    pub fn is_done(&self) -> bool {
        self.handle.frame().is_done()
    }

    /// Resumes the task from its initial suspension on the current thread.
    ///
    /// It returns when the task completes or parks, for example, on an offloaded callable.
    /// A parked task finishes on another thread: poll [`is_done`](Task::is_done), await the
    /// task, or use [`blocking_wait`](crate::blocking_wait) to wait for it.
    ///
    /// Starting a task that was started before does nothing.
    pub fn start(&mut self) {
        if self.handle.frame().try_start() {
            trace!("starting {:?}", self.handle);
            frame::run(self.handle.erased());
        }
    }

    /// Returns the produced value, or raises the panic the body captured.
    ///
    /// # Panics
    ///
    /// If the body panicked, or if the task isn't completed.
    pub fn get(self) -> T {
        self.take_result().get()
    }

    /// Returns the produced value or the panic the body captured.
    ///
    /// # Panics
    ///
    /// If the task isn't completed.
    pub fn try_get(self) -> Result<T, Panic> {
        self.take_result().into_result()
    }

    fn take_result(self) -> Slot<T> {
        // `self` is the owner of the frame.
        unsafe { self.handle.frame().take_result() }
    }

    #[inline(always)]
    pub(crate) fn frame_ref(&self) -> FrameRef {
        FrameRef::new(self.handle.erased())
    }

    #[inline(always)]
    pub(crate) fn erased(&self) -> Arc<dyn Resume> {
        self.handle.erased()
    }

    #[inline(always)]
    pub(crate) fn frame(&self) -> &Frame<T> {
        self.handle.frame()
    }
}

impl<T: 'static> Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("handle", &self.handle).finish()
    }
}
