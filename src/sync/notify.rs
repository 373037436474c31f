use crossbeam::channel::Sender;
use crossbeam_utils::sync::Unparker;

/// A synchronization object that is told when an awaitable chain has completed.
///
/// It is what a [`SynchronizedTask`](crate::sync::SynchronizedTask) signals after its result
/// is stored. The signal comes from whichever thread finished the chain.
pub trait Notify {
    fn notify_completed(&self);
}

impl Notify for Unparker {
    #[inline(always)]
    fn notify_completed(&self) {
        self.unpark();
    }
}

impl Notify for Sender<()> {
    fn notify_completed(&self) {
        // Nobody to tell if the receiver is gone.
        let _ = self.send(());
    }
}
