//! Low-level coroutine machinery: frame ownership, the driver loop and the awaiter protocol.
pub mod handle;
pub(crate) mod frame;
pub mod suspend;

pub use handle::*;
pub use suspend::*;
