//! This module contains [`Frame`], the shared state of a task, and [`run`], the driver loop
//! that resumes frames by symmetric transfer.
use std::any::Any;
use std::cell::{Cell, RefCell, UnsafeCell};
use std::ops::{Coroutine, CoroutineState};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;
use crate::coroutine::handle::Resumer;
use crate::coroutine::Suspend;
use crate::result::{Panic, Slot};
use crate::sync::Notify;

/// The alias for the body of a task-like coroutine.
/// It may be resumed on any thread, so it must be [`Send`].
pub(crate) type Body<T> = Pin<Box<dyn Coroutine<Yield = Suspend, Return = T> + Send>>;

/// Not started yet. Only the owner touches the frame.
const IDLE: u8 = 0;
/// Started and not finished, no continuation registered.
const RUNNING: u8 = 1;
/// Started and not finished, the continuation is registered.
const AWAITED: u8 = 2;
/// The result is stored. The driver doesn't touch the body or the result anymore.
const DONE: u8 = 3;

/// What runs after a task has finished.
pub(crate) enum Continuation {
    /// The awaiting task. It is not kept alive by the awaited one.
    Resume(Weak<dyn Resume>),
    /// A waiting thread outside of any coroutine.
    Notify(Box<dyn Notify + Send>),
}

/// The outcome of registering a continuation.
pub(crate) enum Attach {
    /// The task was idle and is now owned by the caller's driver, which has to run it.
    Start,
    /// The task runs somewhere else and will run the continuation when it is done.
    Pending,
    /// The task has already finished. The continuation is handed back.
    Done(Continuation),
}

/// The unit of work the driver has to do after a resumption.
pub(crate) enum Next {
    /// Resume this frame right away.
    Resume(Arc<dyn Resume>),
    /// The current frame awaits this one.
    Transfer(Arc<dyn Resume>),
    /// The current frame is parked. Hand it over and stop.
    Park(Box<dyn FnOnce(Resumer) + Send>),
    /// The chain is finished. Signal the waiting thread and stop.
    Signal(Box<dyn Notify + Send>),
    /// Nothing to resume.
    Idle,
}

/// The object-safe part of a [`Frame`] the driver works with.
pub(crate) trait Resume: Send + Sync {
    /// Resumes the body until its next suspension point.
    /// Must be called only by the driver that started the frame or was handed it.
    fn step(&self) -> Next;

    /// Registers the continuation of the frame. Called once, by the owner of the task.
    fn attach(&self, continuation: Continuation) -> Attach;

    fn is_abandoned(&self) -> bool;
}

/// The state of a task, shared between its owner and the drivers that run it.
///
/// `body` and `result` belong to the driver from the moment the frame leaves `IDLE` until it
/// becomes `DONE`, and to the owner before and after that. `continuation` is written by the
/// owner before it publishes `AWAITED`, and read by the driver after it sees `AWAITED`.
pub(crate) struct Frame<T: 'static> {
    state: AtomicU8,
    abandoned: AtomicBool,
    continuation: UnsafeCell<Option<Continuation>>,
    body: UnsafeCell<Option<Body<T>>>,
    result: UnsafeCell<Slot<T>>,
}

unsafe impl<T: Send + 'static> Send for Frame<T> {}
unsafe impl<T: Send + 'static> Sync for Frame<T> {}

impl<T: 'static> Frame<T> {
    pub(crate) fn new(body: Body<T>) -> Self {
        Self {
            state: AtomicU8::new(IDLE),
            abandoned: AtomicBool::new(false),
            continuation: UnsafeCell::new(None),
            body: UnsafeCell::new(Some(body)),
            result: UnsafeCell::new(Slot::new()),
        }
    }

    #[inline(always)]
    pub(crate) fn is_done(&self) -> bool {
        self.state.load(Ordering::Acquire) == DONE
    }

    /// Moves an idle frame to the running state. Returns `false` if it was started before.
    pub(crate) fn try_start(&self) -> bool {
        self.state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Marks the frame as dropped by its owner. A parked body is not resumed after this.
    pub(crate) fn abandon(&self) {
        self.abandoned.store(true, Ordering::Release);
    }

    /// Moves the result out. Returns an empty slot if the task is not done.
    ///
    /// # Safety
    ///
    /// Only the owner of the task may call it.
    pub(crate) unsafe fn take_result(&self) -> Slot<T> {
        if !self.is_done() {
            return Slot::new();
        }

        unsafe { (*self.result.get()).take() }
    }

    /// Publishes the result and returns the continuation to run.
    fn complete(&self) -> Next {
        if self.state.swap(DONE, Ordering::AcqRel) != AWAITED {
            return Next::Idle;
        }

        match unsafe { (*self.continuation.get()).take() } {
            Some(Continuation::Resume(awaiting)) => match awaiting.upgrade() {
                Some(awaiting) => Next::Resume(awaiting),
                None => Next::Idle,
            },
            Some(Continuation::Notify(sync)) => Next::Signal(sync),
            None => Next::Idle,
        }
    }
}

impl<T: Send + 'static> Resume for Frame<T> {
    fn step(&self) -> Next {
        let body = unsafe { &mut *self.body.get() };
        let Some(coroutine) = body.as_mut() else {
            return Next::Idle;
        };

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| coroutine.as_mut().resume(()))) {
            Ok(CoroutineState::Yielded(Suspend::Transfer(child))) => {
                return Next::Transfer(child.into_inner());
            }
            Ok(CoroutineState::Yielded(Suspend::Park(schedule))) => return Next::Park(schedule),
            Ok(CoroutineState::Complete(value)) => Ok(value),
            Err(payload) => {
                let panic = Panic::new(payload);
                trace!("captured a panic from a task body: {panic}");
                Err(panic)
            }
        };

        *body = None;
        let result = unsafe { &mut *self.result.get() };
        match outcome {
            Ok(value) => result.set_value(value),
            Err(panic) => result.set_panic(panic),
        }

        self.complete()
    }

    fn attach(&self, continuation: Continuation) -> Attach {
        let mut state = self.state.load(Ordering::Acquire);
        assert_ne!(state, AWAITED, "the task already has a continuation");
        if state == DONE {
            return Attach::Done(continuation);
        }

        unsafe { *self.continuation.get() = Some(continuation) };
        loop {
            match self.state.compare_exchange_weak(state, AWAITED, Ordering::AcqRel, Ordering::Acquire) {
                Ok(IDLE) => return Attach::Start,
                Ok(_) => return Attach::Pending,
                Err(DONE) => {
                    // Finished in the meantime without looking at the continuation.
                    let Some(continuation) = (unsafe { (*self.continuation.get()).take() }) else {
                        unreachable!("the continuation was stored before the exchange");
                    };
                    return Attach::Done(continuation);
                }
                Err(actual) => state = actual,
            }
        }
    }

    #[inline(always)]
    fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::Acquire)
    }
}

impl<T: 'static> Drop for Frame<T> {
    fn drop(&mut self) {
        if let Some(body) = self.body.get_mut().take() {
            release(body);
        }
    }
}

thread_local! {
    static RELEASING: Cell<bool> = const { Cell::new(false) };
    static PENDING: RefCell<Vec<Box<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

/// Resets [`RELEASING`] even if a destructor panics.
struct ReleaseGuard;

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        RELEASING.set(false);
    }
}

/// Drops an abandoned body.
///
/// A suspended body owns the task it awaits, which owns the next body, and so on.
/// Bodies released while another one is being dropped are queued and dropped by the
/// outermost call, so tearing down a chain doesn't depend on its depth.
fn release<B: 'static>(body: B) {
    if RELEASING.get() {
        // If the thread is exiting and the queue is gone, `body` is dropped in place.
        let _ = PENDING.try_with(|pending| pending.borrow_mut().push(Box::new(body)));
        return;
    }

    RELEASING.set(true);
    let _guard = ReleaseGuard;
    drop(body);
    while let Some(next) = PENDING.try_with(|pending| pending.borrow_mut().pop()).ok().flatten() {
        drop(next);
    }
}

/// Drives `start` and every frame it transfers control to.
///
/// Each resumption returns the next unit of work instead of resuming it, so the stack depth
/// doesn't depend on how deep the chain of awaiting tasks is.
///
/// The loop holds a reference to the frame it runs, so the owner may drop the task at any
/// moment. An abandoned frame is not resumed anymore.
pub(crate) fn run(start: Arc<dyn Resume>) {
    let mut current = start;
    loop {
        if current.is_abandoned() {
            trace!("stopping at an abandoned task {:p}", Arc::as_ptr(&current) as *const ());
            return;
        }

        match current.step() {
            Next::Resume(next) => current = next,
            Next::Transfer(child) => {
                match child.attach(Continuation::Resume(Arc::downgrade(&current))) {
                    Attach::Start => current = child,
                    Attach::Pending => return,
                    Attach::Done(_) => {}
                }
            }
            Next::Park(schedule) => {
                trace!("parking {:p}", Arc::as_ptr(&current) as *const ());
                schedule(Resumer::new(current));
                return;
            }
            Next::Signal(sync) => {
                trace!("the chain is completed, signalling the waiting thread");
                sync.notify_completed();
                return;
            }
            Next::Idle => return,
        }
    }
}
