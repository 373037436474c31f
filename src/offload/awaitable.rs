//! This module contains [`Offload`], the awaitable that runs a blocking callable on a worker
//! thread and resumes the awaiting task when it is done.
use std::fmt::{self, Debug};
use std::thread;
use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, trace};
use crate::cfg;
use crate::coroutine::{Awaiter, IntoAwaiter, Resumer, Suspend};
use crate::result::Slot;

/// Runs `func` on a separate thread when awaited.
///
/// Awaiting the returned value suspends the task, starts `func` on a new detached worker
/// thread, and resumes the task on that worker thread once `func` returned.
/// The `co_await!` expression evaluates to what `func` returned. If `func` panicked,
/// the panic is raised again in the awaiting task.
///
/// # Example
///
/// ```ignore
/// use cotask::{co_await, offload, task};
///
/// #[task]
/// fn read_config() -> String {
///     co_await!(offload(|| std::fs::read_to_string("config.toml").unwrap_or_default()))
/// }
/// ```
pub fn offload<F, R>(func: F) -> Offload<F>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    Offload { func }
}

/// A callable that runs on a worker thread when awaited. See [`offload`].
///
/// It can be awaited only once: awaiting consumes it.
#[must_use = "an offloaded callable does nothing unless awaited"]
pub struct Offload<F> {
    func: F,
}

impl<F, R> IntoAwaiter for Offload<F>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    type Output = R;
    type Awaiter = OffloadAwaiter<F, R>;

    fn into_awaiter(self) -> OffloadAwaiter<F, R> {
        let (sender, receiver) = channel::bounded(1);
        OffloadAwaiter {
            func: Some(self.func),
            sender: Some(sender),
            receiver,
        }
    }
}

/// The awaiter of an [`Offload`].
///
/// The worker thread writes the result once, and the task reads it once after the worker
/// resumed it.
pub struct OffloadAwaiter<F, R> {
    func: Option<F>,
    sender: Option<Sender<Slot<R>>>,
    receiver: Receiver<Slot<R>>,
}

impl<F, R> Awaiter for OffloadAwaiter<F, R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    type Output = R;

    #[inline(always)]
    fn is_ready(&self) -> bool {
        false
    }

    fn suspend(&mut self) -> Suspend {
        let (Some(func), Some(sender)) = (self.func.take(), self.sender.take()) else {
            unreachable!("an offloaded callable is awaited only once");
        };

        Suspend::park(move |resumer| spawn_worker(func, sender, resumer))
    }

    fn resume(self) -> R {
        match self.receiver.try_recv() {
            Ok(slot) => slot.get(),
            Err(err) => unreachable!("the worker resumed the task without a result: {err}"),
        }
    }
}

impl<F, R> Debug for OffloadAwaiter<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OffloadAwaiter")
            .field("started", &self.func.is_none())
            .finish()
    }
}

/// Spawns a detached thread that runs `func`, sends its result and resumes the task.
fn spawn_worker<F, R>(func: F, sender: Sender<Slot<R>>, resumer: Resumer)
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let name = cfg::config_thread_name();
    let stack_size = cfg::config_stack_size();
    debug!("spawning offload worker \"{name}\" for {resumer:?}");

    let mut builder = thread::Builder::new().name(name.to_string());
    if stack_size != 0 {
        builder = builder.stack_size(stack_size);
    }

    builder
        .spawn(move || {
            let slot = Slot::capture(func);
            // The receiver lives in the parked task, which can't be resumed by anyone else.
            let _ = sender.send(slot);
            trace!("offloaded callable finished, resuming {resumer:?}");
            resumer.resume();
        })
        .expect("failed to create offload worker thread");
}
