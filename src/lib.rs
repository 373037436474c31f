//! Lazily started coroutine tasks with symmetric transfer, thread offloading, a blocking
//! bridge for synchronous code and pull-based generators.
//!
//! A [`Task`] doesn't run until it is awaited with [`co_await!`] from another task or waited
//! for with [`blocking_wait`]. Awaiting a task transfers control to it directly, so chains
//! of any depth run in constant stack space. [`offload()`] moves blocking work to a worker
//! thread; the awaiting task continues on that thread afterwards.
//!
//! A [`Generator`] is a lazy sequence: every pull runs its body up to the next `yield`.
//!
//! Panics play the role of errors: a panic in a body or in an offloaded callable is captured
//! and raised again where the result is read.
//!
//! The crate requires nightly Rust. Code that defines tasks or generators must enable
//! `#![feature(coroutines, coroutine_trait, stmt_expr_attributes)]`.
#![feature(coroutines)]
#![feature(coroutine_trait)]
#![feature(stmt_expr_attributes)]

extern crate self as cotask;

pub mod cfg;
pub mod coroutine;
pub mod generator;
pub mod offload;
pub mod result;
pub mod sync;
pub mod task;
mod macros;

pub use coroutine::{Awaiter, IntoAwaiter, Ready, Resumer, Suspend, ready};
pub use generator::{Generator, fibonacci, iota};
pub use offload::{Offload, offload};
pub use result::{Panic, Slot};
pub use sync::{Notify, SynchronizedTask, blocking_wait, try_blocking_wait};
pub use task::Task;

pub use cotask_proc::{generator, task, test_task};
