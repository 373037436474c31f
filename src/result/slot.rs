//! This module contains [`Slot`], the storage of a result that is produced once and read once.
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use crate::result::Panic;

/// A tagged container for the result of a computation: nothing yet, a captured panic or
/// a value. For `()`, a value means "finished without a value".
///
/// Once a value or a panic is written, the slot is never written again.
/// Reading a slot that holds a panic raises that panic and never returns a value.
#[derive(Debug)]
pub enum Slot<T> {
    Empty,
    Panicked(Panic),
    Ready(T),
}

impl<T> Slot<T> {
    pub const fn new() -> Self {
        Slot::Empty
    }

    /// Runs `func` and stores what it returned or the panic it raised.
    pub fn capture<F: FnOnce() -> T>(func: F) -> Self {
        match panic::catch_unwind(AssertUnwindSafe(func)) {
            Ok(value) => Slot::Ready(value),
            Err(payload) => Slot::Panicked(Panic::new(payload)),
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Writes the produced value.
    ///
    /// # Panics
    ///
    /// If the slot was already written.
    pub fn set_value(&mut self, value: T) {
        assert!(self.is_empty(), "the result is already set");
        *self = Slot::Ready(value);
    }

    /// Writes the captured panic.
    ///
    /// # Panics
    ///
    /// If the slot was already written.
    pub fn set_panic(&mut self, panic: Panic) {
        assert!(self.is_empty(), "the result is already set");
        *self = Slot::Panicked(panic);
    }

    /// Moves the content out and leaves the slot empty.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Slot::Empty)
    }

    /// Returns the value or the captured panic.
    ///
    /// # Panics
    ///
    /// If nothing was written yet. It is a misuse: read a slot only after its producer finished.
    pub fn into_result(self) -> Result<T, Panic> {
        match self {
            Slot::Ready(value) => Ok(value),
            Slot::Panicked(panic) => Err(panic),
            Slot::Empty => panic!("the result is read before it was produced"),
        }
    }

    /// Returns the value, or raises the captured panic on the caller's thread.
    ///
    /// # Panics
    ///
    /// If a panic was captured, or if nothing was written yet.
    pub fn get(self) -> T {
        match self.into_result() {
            Ok(value) => value,
            Err(panic) => panic.resume(),
        }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Empty
    }
}
