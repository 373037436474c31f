//! This module contains [`Handle`], the unique owner of a task frame, [`FrameRef`], the
//! type-erased reference the driver works with, and [`Resumer`].
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::trace;
use crate::coroutine::frame::{self, Frame, Resume};

/// Unique ownership of one heap-allocated task frame.
///
/// A `Handle` can't be copied. Moving it moves the ownership. Dropping it abandons the
/// coroutine: a suspended body is never resumed again and its state is released, either
/// right away or, if the frame is parked on another thread, by whoever holds the
/// [`Resumer`] once it lets go of it.
pub struct Handle<T: 'static> {
    frame: Arc<Frame<T>>,
}

impl<T: 'static> Handle<T> {
    pub(crate) fn new(frame: Frame<T>) -> Self {
        Self { frame: Arc::new(frame) }
    }

    #[inline(always)]
    pub(crate) fn frame(&self) -> &Frame<T> {
        &self.frame
    }

    /// Abandons the coroutine right now. The same as dropping the handle.
    pub fn destroy(self) {
        drop(self);
    }
}

impl<T: Send + 'static> Handle<T> {
    /// Returns a type-erased reference to the frame for the driver.
    #[inline(always)]
    pub(crate) fn erased(&self) -> Arc<dyn Resume> {
        self.frame.clone()
    }
}

impl<T: 'static> Drop for Handle<T> {
    fn drop(&mut self) {
        self.frame.abandon();
    }
}

impl<T: 'static> Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&Arc::as_ptr(&self.frame)).finish()
    }
}

/// A type-erased reference to a suspended task frame, used in [`Suspend::Transfer`].
///
/// It is opaque outside of the crate.
///
/// [`Suspend::Transfer`]: crate::coroutine::Suspend::Transfer
pub struct FrameRef {
    frame: Arc<dyn Resume>,
}

impl FrameRef {
    pub(crate) fn new(frame: Arc<dyn Resume>) -> Self {
        Self { frame }
    }

    pub(crate) fn into_inner(self) -> Arc<dyn Resume> {
        self.frame
    }
}

impl Debug for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameRef({:p})", Arc::as_ptr(&self.frame) as *const ())
    }
}

/// The right to resume a parked coroutine. See [`Suspend::park`](crate::coroutine::Suspend::park).
///
/// Calling [`resume`](Resumer::resume) drives the coroutine (and then every continuation it
/// completes into) on the current thread. The `Resumer` keeps the frame alive, so it stays
/// valid even if the owner of the task has dropped it in the meantime; in that case the
/// body is not resumed, and the frame is released.
///
/// Dropping a `Resumer` without resuming leaves the coroutine parked forever; its owner can
/// still drop it safely.
pub struct Resumer {
    frame: Arc<dyn Resume>,
}

impl Resumer {
    pub(crate) fn new(frame: Arc<dyn Resume>) -> Self {
        Self { frame }
    }

    /// Resumes the parked coroutine on the current thread.
    pub fn resume(self) {
        if self.frame.is_abandoned() {
            trace!("{self:?} is not resumed, its task was dropped");
            return;
        }

        frame::run(self.frame);
    }
}

impl Debug for Resumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resumer({:p})", Arc::as_ptr(&self.frame) as *const ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountDrops(Arc<AtomicUsize>);

    impl Drop for CountDrops {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn frame_with_guard(drops: &Arc<AtomicUsize>) -> Frame<()> {
        let guard = CountDrops(drops.clone());
        Frame::new(Box::pin(#[coroutine] static move || {
            let _guard = &guard;
        }))
    }

    #[test]
    fn test_drop_finalizes_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let handle = Handle::new(frame_with_guard(&drops));
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        drop(handle);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_move_transfers_ownership() {
        let drops = Arc::new(AtomicUsize::new(0));
        let handle = Handle::new(frame_with_guard(&drops));
        let moved = handle;
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        moved.destroy();
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resumer_keeps_abandoned_frame_alive() {
        let drops = Arc::new(AtomicUsize::new(0));
        let handle = Handle::new(frame_with_guard(&drops));
        let resumer = Resumer::new(handle.erased());

        drop(handle);
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        resumer.resume();
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }
}
