#![feature(coroutines, coroutine_trait, stmt_expr_attributes)]

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, ThreadId};
use std::time::Duration;
use cotask::{
    blocking_wait, co_await, offload, ready, task, try_blocking_wait, Awaiter, IntoAwaiter,
    Resumer, Suspend, Task,
};
use crossbeam::channel::{self, Sender};

/// Parks the awaiting task and hands its resumer over to the channel.
struct Handover(Sender<Resumer>);

impl Awaiter for Handover {
    type Output = ();

    fn is_ready(&self) -> bool {
        false
    }

    fn suspend(&mut self) -> Suspend {
        let sender = self.0.clone();
        Suspend::park(move |resumer| sender.send(resumer).unwrap())
    }

    fn resume(self) {}
}

impl IntoAwaiter for Handover {
    type Output = ();
    type Awaiter = Self;

    fn into_awaiter(self) -> Self {
        self
    }
}

/// Parks the awaiting task and forgets about it.
struct Abandon;

impl Awaiter for Abandon {
    type Output = ();

    fn is_ready(&self) -> bool {
        false
    }

    fn suspend(&mut self) -> Suspend {
        Suspend::park(drop)
    }

    fn resume(self) {}
}

impl IntoAwaiter for Abandon {
    type Output = ();
    type Awaiter = Self;

    fn into_awaiter(self) -> Self {
        self
    }
}

struct CountDrops(Arc<AtomicUsize>);

impl Drop for CountDrops {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[task]
fn current_thread_and_value() -> (ThreadId, i32) {
    (thread::current().id(), 7)
}

#[task]
fn fail() -> i32 {
    panic!("inner failure");
}

#[task]
fn forward(after: Arc<AtomicUsize>) -> i32 {
    let value = co_await!(fail());
    after.fetch_add(1, Ordering::SeqCst);
    value
}

#[test]
fn test_immediate_value_runs_on_the_waiting_thread() {
    let (runner, value) = blocking_wait(current_thread_and_value());
    assert_eq!(runner, thread::current().id());
    assert_eq!(value, 7);
}

#[test]
fn test_task_is_lazy() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let task = Task::new(#[coroutine] static move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(runs.load(Ordering::SeqCst), 0);
    blocking_wait(task);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_panic_propagates_through_the_chain() {
    let after = Arc::new(AtomicUsize::new(0));
    let panic = try_blocking_wait(forward(after.clone())).unwrap_err();

    assert_eq!(panic.message(), Some("inner failure"));
    assert_eq!(after.load(Ordering::SeqCst), 0);
}

#[test]
fn test_awaiting_task_can_catch_the_panic() {
    let outer = Task::new(#[coroutine] static move || {
        let mut awaiter = fail().into_awaiter();
        if !awaiter.is_ready() {
            yield awaiter.suspend();
        }
        let caught = panic::catch_unwind(AssertUnwindSafe(|| awaiter.resume()));
        caught.is_err()
    });

    assert!(blocking_wait(outer));
}

#[test]
fn test_await_completed_task() {
    let mut inner = Task::new(#[coroutine] static move || 11);
    inner.start();
    assert!(inner.is_done());

    let outer = Task::new(#[coroutine] static move || co_await!(inner) + 1);
    assert_eq!(blocking_wait(outer), 12);
}

#[test]
fn test_await_ready() {
    let task = Task::new(#[coroutine] static move || {
        let text = co_await!(ready(String::from("ready")));
        text.len()
    });
    assert_eq!(blocking_wait(task), 5);
}

#[test]
fn test_resume_parked_task_from_another_thread() {
    let (sender, receiver) = channel::bounded(1);
    let mut task = Task::new(#[coroutine] static move || {
        co_await!(Handover(sender));
        thread::current().id()
    });

    task.start();
    assert!(!task.is_done());

    let resumer = receiver.recv().unwrap();
    let resumed_on = thread::spawn(move || {
        resumer.resume();
        thread::current().id()
    })
    .join()
    .unwrap();

    assert!(task.is_done());
    assert_eq!(task.get(), resumed_on);
}

#[test]
fn test_drop_suspended_task_releases_its_state() {
    let drops = Arc::new(AtomicUsize::new(0));
    let guard = CountDrops(drops.clone());
    let mut task = Task::new(#[coroutine] static move || {
        let _guard = guard;
        co_await!(Abandon);
    });

    task.start();
    assert!(!task.is_done());
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    drop(task);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_drop_task_while_offloaded() {
    let drops = Arc::new(AtomicUsize::new(0));
    let resumed = Arc::new(AtomicBool::new(false));
    let guard = CountDrops(drops.clone());
    let flag = resumed.clone();
    let mut task = Task::new(#[coroutine] static move || {
        let _guard = guard;
        let text = String::from("owned by the body");
        co_await!(offload(|| thread::sleep(Duration::from_millis(50))));
        flag.store(true, Ordering::SeqCst);
        text.len()
    });

    task.start();
    assert!(!task.is_done());
    drop(task);

    // The worker still holds the frame until its callable returns.
    thread::sleep(Duration::from_millis(300));
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert!(!resumed.load(Ordering::SeqCst));
}

#[test]
fn test_resume_after_drop_releases_without_running() {
    let drops = Arc::new(AtomicUsize::new(0));
    let resumed = Arc::new(AtomicBool::new(false));
    let guard = CountDrops(drops.clone());
    let flag = resumed.clone();
    let (sender, receiver) = channel::bounded(1);
    let mut task = Task::new(#[coroutine] static move || {
        let _guard = guard;
        co_await!(Handover(sender));
        flag.store(true, Ordering::SeqCst);
    });

    task.start();
    let resumer = receiver.recv().unwrap();
    drop(task);
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    thread::spawn(move || resumer.resume()).join().unwrap();
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert!(!resumed.load(Ordering::SeqCst));
}

#[test]
fn test_drop_resumer_and_task_in_any_order() {
    let drops = Arc::new(AtomicUsize::new(0));
    let guard = CountDrops(drops.clone());
    let (sender, receiver) = channel::bounded(1);
    let mut task = Task::new(#[coroutine] static move || {
        let _guard = guard;
        co_await!(Handover(sender));
    });

    task.start();
    let resumer = receiver.recv().unwrap();
    drop(resumer);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(task);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_await_task_started_elsewhere() {
    let (sender, receiver) = channel::bounded(1);
    let mut inner = Task::new(#[coroutine] static move || {
        co_await!(Handover(sender));
        20
    });
    inner.start();
    assert!(!inner.is_done());

    let resumer = receiver.recv().unwrap();
    let resuming = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        resumer.resume();
    });

    let outer = Task::new(#[coroutine] static move || co_await!(inner) + 1);
    assert_eq!(blocking_wait(outer), 21);
    resuming.join().unwrap();
}

#[test]
fn test_drop_never_started_task() {
    let drops = Arc::new(AtomicUsize::new(0));
    let guard = CountDrops(drops.clone());
    let task = Task::new(#[coroutine] static move || {
        let _guard = guard;
    });

    drop(task);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
#[should_panic(expected = "the result is read before it was produced")]
fn test_get_before_completion() {
    let task = Task::new(#[coroutine] static move || 1);
    task.get();
}
