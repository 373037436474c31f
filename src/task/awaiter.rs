use crate::coroutine::{Awaiter, IntoAwaiter, Suspend};
use crate::task::Task;

/// The awaiter of a [`Task`]: awaiting a task starts it by symmetric transfer.
///
/// If the task is already completed, its result is taken without suspending.
/// Otherwise the awaiting coroutine suspends, becomes the continuation of the task,
/// and the driver resumes the task in its place. A task that was started before and runs
/// on another thread resumes the awaiting coroutine there once it is done.
#[derive(Debug)]
pub struct TaskAwaiter<T: 'static> {
    task: Task<T>,
}

impl<T: Send + 'static> Awaiter for TaskAwaiter<T> {
    type Output = T;

    #[inline(always)]
    fn is_ready(&self) -> bool {
        self.task.is_done()
    }

    #[inline(always)]
    fn suspend(&mut self) -> Suspend {
        Suspend::Transfer(self.task.frame_ref())
    }

    fn resume(self) -> T {
        self.task.get()
    }
}

impl<T: Send + 'static> IntoAwaiter for Task<T> {
    type Output = T;
    type Awaiter = TaskAwaiter<T>;

    fn into_awaiter(self) -> TaskAwaiter<T> {
        TaskAwaiter { task: self }
    }
}
