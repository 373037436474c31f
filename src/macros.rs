/// Awaits a value from a task body and evaluates to its result.
///
/// The value must implement [`IntoAwaiter`](crate::IntoAwaiter): a [`Task`](crate::Task),
/// an [`Offload`](crate::Offload), a [`Ready`](crate::Ready) or a custom awaitable.
/// If the awaiter is not ready, the task suspends here, and the driver resumes it when the
/// awaited computation has finished. A panic of the awaited computation is raised again here.
///
/// It can be used only inside a task body, for example, a `#[task]` function.
///
/// # Example
///
/// ```ignore
/// use cotask::{co_await, task};
///
/// #[task]
/// fn double(value: u32) -> u32 {
///     value * 2
/// }
///
/// #[task]
/// fn quadruple(value: u32) -> u32 {
///     let doubled = co_await!(double(value));
///     co_await!(double(doubled))
/// }
/// ```
#[macro_export]
macro_rules! co_await {
    ($awaitable:expr) => {{
        let mut awaiter = $crate::IntoAwaiter::into_awaiter($awaitable);
        if !$crate::Awaiter::is_ready(&awaiter) {
            yield $crate::Awaiter::suspend(&mut awaiter);
        }
        $crate::Awaiter::resume(awaiter)
    }};
}

/// Creates a suspended [`Task`](crate::Task) from the block of code.
///
/// The block is wrapped in a static move coroutine, so it takes ownership of everything
/// it captures and may hold borrows across [`co_await!`](crate::co_await).
///
/// # Example
///
/// ```ignore
/// use cotask::{blocking_wait, co_await, offload, task_block};
///
/// let task = task_block!({
///     co_await!(offload(|| 40)) + 2
/// });
/// assert_eq!(blocking_wait(task), 42);
/// ```
#[macro_export]
macro_rules! task_block {
    ($code:block) => {
        $crate::Task::new(#[coroutine] static move || $code)
    };
}

/// Creates a suspended [`Generator`](crate::Generator) from the block of code.
/// The block yields the values of the sequence with `yield`.
#[macro_export]
macro_rules! generator_block {
    ($code:block) => {
        $crate::Generator::new(#[coroutine] static move || $code)
    };
}
