//! Result storage shared by tasks, offloaded callables and the blocking bridge.
pub mod slot;
pub mod panic;

pub use slot::*;
pub use panic::*;
