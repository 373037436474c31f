//! This module contains [`Task`] and its awaiter.
pub mod task;
pub mod awaiter;

pub use task::*;
pub use awaiter::*;
