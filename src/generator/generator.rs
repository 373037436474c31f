//! This module contains [`Generator`], a lazy, pull-based sequence producer.
use std::any::TypeId;
use std::fmt::{self, Debug};
use std::iter::FusedIterator;
use std::ops::{Coroutine, CoroutineState};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use crate::coroutine::Suspend;

/// The alias for the body of a generator. It yields the values and returns nothing.
type GeneratorBody<T> = Pin<Box<dyn Coroutine<Yield = T, Return = ()>>>;

/// A lazy, forward-only sequence of values produced by a coroutine body.
///
/// Creating a generator runs nothing. Every [`pull`](Generator::pull) resumes the body from
/// the last `yield` up to the next one, so the body runs synchronously between yields.
/// The body yields plain `T` values, so [`co_await!`](crate::co_await) doesn't type-check
/// inside it: a generator can't wait for anything. A `Generator<Suspend>` would accept
/// awaits, so creating one panics.
///
/// A generator is not restartable: once the body finished, pulls return `None`.
/// Dropping a generator in the middle of the sequence drops its body without resuming it.
///
/// # Example
///
/// ```ignore
/// use cotask::generator;
///
/// #[generator]
/// fn countdown(mut from: u32) -> u32 {
///     while from > 0 {
///         yield from;
///         from -= 1;
///     }
/// }
///
/// let mut countdown = countdown(3);
/// while let Some(value) = countdown.pull() {
///     println!("{value}");
/// }
/// ```
pub struct Generator<T> {
    current: Option<T>,
    /// `None` once the body has returned or panicked.
    body: Option<GeneratorBody<T>>,
}

impl<T: 'static> Generator<T> {
    /// Creates a suspended generator from the body coroutine.
    ///
    /// # Panics
    ///
    /// If `T` is [`Suspend`]: such a body could await, which a generator never does.
    pub fn new<C>(body: C) -> Self
    where
        C: Coroutine<Yield = T, Return = ()> + 'static,
    {
        assert_ne!(
            TypeId::of::<T>(),
            TypeId::of::<Suspend>(),
            "a generator can't yield await requests"
        );

        Self {
            current: None,
            body: Some(Box::pin(body)),
        }
    }
}

impl<T> Generator<T> {
    /// Resumes the body until the next `yield` and returns the yielded value.
    ///
    /// The reference is valid until the next pull. Returns `None` once the body has finished.
    ///
    /// # Panics
    ///
    /// If the body panics, the panic propagates from this call and the generator is finished.
    pub fn pull(&mut self) -> Option<&T> {
        self.advance();
        self.current.as_ref()
    }

    /// Returns the value of the last successful [`pull`](Generator::pull).
    ///
    /// [`Iterator::next`] moves the value out instead of keeping it, so after `next` this
    /// returns `None`.
    #[inline(always)]
    pub fn value(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Returns `true` once the body has returned or panicked.
    #[inline(always)]
    pub fn is_done(&self) -> bool {
        self.body.is_none()
    }

    fn advance(&mut self) {
        self.current = None;
        let Some(body) = self.body.as_mut() else {
            return;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| body.as_mut().resume(()))) {
            Ok(CoroutineState::Yielded(value)) => self.current = Some(value),
            Ok(CoroutineState::Complete(())) => self.body = None,
            Err(payload) => {
                self.body = None;
                panic::resume_unwind(payload);
            }
        }
    }
}

impl<T> Iterator for Generator<T> {
    type Item = T;

    /// Pulls the next value and moves it out of the generator.
    fn next(&mut self) -> Option<T> {
        self.advance();
        self.current.take()
    }
}

impl<T> FusedIterator for Generator<T> {}

impl<T: Debug> Debug for Generator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("current", &self.value())
            .field("done", &self.is_done())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn one_two() -> Generator<i32> {
        Generator::new(#[coroutine] static || {
            yield 1;
            yield 2;
        })
    }

    #[test]
    fn test_pull() {
        let mut numbers = one_two();
        assert_eq!(numbers.value(), None);
        assert_eq!(numbers.pull(), Some(&1));
        assert_eq!(numbers.value(), Some(&1));
        assert_eq!(numbers.pull(), Some(&2));
        assert_eq!(numbers.pull(), None);
        assert!(numbers.is_done());
        assert_eq!(numbers.pull(), None);
    }

    #[test]
    fn test_lazy() {
        let started = Rc::new(Cell::new(false));
        let flag = started.clone();
        let mut numbers = Generator::new(#[coroutine] static move || {
            flag.set(true);
            yield 10;
        });

        assert!(!started.get());
        assert_eq!(numbers.pull(), Some(&10));
        assert!(started.get());
    }

    #[test]
    fn test_iterator() {
        assert_eq!(one_two().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_value_after_pull_and_next() {
        let mut numbers = one_two();
        assert_eq!(numbers.pull(), Some(&1));
        assert_eq!(numbers.value(), Some(&1));
        assert_eq!(numbers.next(), Some(2));
        assert_eq!(numbers.value(), None);
    }

    #[test]
    #[should_panic(expected = "a generator can't yield await requests")]
    fn test_await_requests_are_not_items() {
        let _ = Generator::<Suspend>::new(#[coroutine] static || {
            yield Suspend::park(drop);
        });
    }

    #[test]
    fn test_drop_mid_iteration() {
        let resumed = Rc::new(Cell::new(0));
        let counter = resumed.clone();
        let mut numbers = Generator::new(#[coroutine] static move || {
            loop {
                counter.set(counter.get() + 1);
                yield counter.get();
            }
        });

        assert_eq!(numbers.pull(), Some(&1));
        assert_eq!(numbers.pull(), Some(&2));
        drop(numbers);
        assert_eq!(resumed.get(), 2);
        assert_eq!(Rc::strong_count(&resumed), 1);
    }
}
