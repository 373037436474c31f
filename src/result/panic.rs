use std::any::Any;
use std::error::Error;
use std::fmt::{self, Debug, Display};
use std::panic;

/// A panic captured from a task body, a generator body or an offloaded callable.
///
/// It is raised again with [`resume`](Panic::resume) by the first read of the result that
/// holds it.
pub struct Panic {
    payload: Box<dyn Any + Send + 'static>,
}

impl Panic {
    pub(crate) fn new(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self { payload }
    }

    /// Returns the panic message if the payload is a `&str` or a `String`.
    pub fn message(&self) -> Option<&str> {
        if let Some(message) = self.payload.downcast_ref::<&'static str>() {
            return Some(message);
        }

        self.payload.downcast_ref::<String>().map(String::as_str)
    }

    /// Returns the raw payload, as [`std::panic::catch_unwind`] would.
    pub fn into_payload(self) -> Box<dyn Any + Send + 'static> {
        self.payload
    }

    /// Continues unwinding with the captured payload. The panic hook is not invoked again.
    pub fn resume(self) -> ! {
        panic::resume_unwind(self.payload)
    }
}

impl Debug for Panic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => f.debug_tuple("Panic").field(&message).finish(),
            None => f.write_str("Panic(<non-string payload>)"),
        }
    }
}

impl Display for Panic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "panicked with message: {message}"),
            None => f.write_str("panicked with a non-string payload"),
        }
    }
}

impl Error for Panic {}
