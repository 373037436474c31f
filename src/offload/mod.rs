//! Offloading blocking work to background threads.
pub mod awaitable;

pub use awaitable::*;
