//! This module contains functions that block the current thread until an awaitable completes.
use crossbeam_utils::sync::Parker;
use tracing::trace;
use crate::coroutine::IntoAwaiter;
use crate::result::Panic;
use crate::sync::SynchronizedTask;

/// Blocks the current thread until `awaitable` completes and returns its value.
///
/// The awaitable starts on the current thread. If it offloads work, the rest of the chain
/// finishes on worker threads while this thread sleeps.
///
/// # Panics
///
/// Raises the panic of the awaited chain, if any, on the current thread.
///
/// # Example
///
/// ```ignore
/// use cotask::{blocking_wait, co_await, offload, task};
///
/// #[task]
/// fn answer() -> u32 {
///     co_await!(offload(|| 42))
/// }
///
/// fn main() {
///     assert_eq!(blocking_wait(answer()), 42);
/// }
/// ```
pub fn blocking_wait<A>(awaitable: A) -> A::Output
where
    A: IntoAwaiter + Send + 'static,
    A::Awaiter: Send,
    A::Output: Send + 'static,
{
    wait_synchronized(awaitable).get()
}

/// Blocks the current thread until `awaitable` completes and returns its value, or the panic
/// that the awaited chain raised.
pub fn try_blocking_wait<A>(awaitable: A) -> Result<A::Output, Panic>
where
    A: IntoAwaiter + Send + 'static,
    A::Awaiter: Send,
    A::Output: Send + 'static,
{
    wait_synchronized(awaitable).try_get()
}

fn wait_synchronized<A>(awaitable: A) -> SynchronizedTask<A::Output>
where
    A: IntoAwaiter + Send + 'static,
    A::Awaiter: Send,
    A::Output: Send + 'static,
{
    let parker = Parker::new();
    let mut task = SynchronizedTask::new(awaitable);
    task.start(parker.unparker().clone());
    trace!("waiting for {task:?}");
    parker.park();
    task
}
