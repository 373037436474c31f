//! This module contains [`SynchronizedTask`], the adapter that lets a thread outside of any
//! coroutine learn when an awaitable chain has completed.
use std::fmt::{self, Debug};
use tracing::trace;
use crate::co_await;
use crate::coroutine::frame::{self, Attach, Continuation, Resume};
use crate::coroutine::IntoAwaiter;
use crate::result::Panic;
use crate::sync::Notify;
use crate::task::Task;

/// A task that awaits one awaitable and then signals a [`Notify`] object.
///
/// It is always the outermost task of a chain: every task inside it forwards the completion
/// through its continuation, so only this one needs to signal.
/// [`blocking_wait`](crate::blocking_wait) is built on it.
///
/// # Example
///
/// ```ignore
/// use cotask::sync::SynchronizedTask;
/// use crossbeam::channel;
///
/// let (sender, receiver) = channel::bounded(1);
/// let mut task = SynchronizedTask::new(compute());
/// task.start(sender);
/// receiver.recv().unwrap();
/// println!("{}", task.get());
/// ```
pub struct SynchronizedTask<T: 'static> {
    task: Task<T>,
}

impl<T: Send + 'static> SynchronizedTask<T> {
    /// Creates a suspended task that awaits `awaitable`.
    pub fn new<A>(awaitable: A) -> Self
    where
        A: IntoAwaiter<Output = T> + Send + 'static,
        A::Awaiter: Send,
    {
        Self {
            task: Task::new(#[coroutine] static move || {
                co_await!(awaitable)
            }),
        }
    }

    /// Associates `sync` with the task and starts it on the current thread.
    ///
    /// `sync` is signalled exactly once, after the result is stored. It may happen before
    /// `start` returns or later on another thread.
    ///
    /// # Panics
    ///
    /// If the task was started before.
    pub fn start<S: Notify + Send + 'static>(&mut self, sync: S) {
        trace!("starting synchronized {:?}", self.task);
        match self.task.frame().attach(Continuation::Notify(Box::new(sync))) {
            Attach::Start => frame::run(self.task.erased()),
            Attach::Pending => {}
            Attach::Done(Continuation::Notify(sync)) => sync.notify_completed(),
            Attach::Done(Continuation::Resume(_)) => unreachable!("the continuation is a notifier"),
        }
    }

    /// Returns `true` once the awaited chain has completed.
    #[inline(always)]
    pub fn is_done(&self) -> bool {
        self.task.is_done()
    }

    /// Returns the value, or raises the captured panic.
    ///
    /// # Panics
    ///
    /// If the awaited chain panicked, or if the completion wasn't signalled yet.
    pub fn get(self) -> T {
        self.task.get()
    }

    /// Returns the value or the captured panic.
    ///
    /// # Panics
    ///
    /// If the completion wasn't signalled yet.
    pub fn try_get(self) -> Result<T, Panic> {
        self.task.try_get()
    }
}

impl<T: 'static> Debug for SynchronizedTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynchronizedTask").field("task", &self.task).finish()
    }
}
