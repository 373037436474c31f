//! The bridge between blocking code and tasks.
pub mod notify;
pub mod synchronized;
pub mod wait;

pub use notify::*;
pub use synchronized::*;
pub use wait::*;
