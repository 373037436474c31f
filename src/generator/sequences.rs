//! Infinite sequences built on [`Generator`].
use std::mem;
use crate::generator::Generator;

/// Yields `start`, `start + 1`, `start + 2`, ... The sequence wraps around on overflow.
pub fn iota(start: u64) -> Generator<u64> {
    Generator::new(#[coroutine] static move || {
        let mut next = start;
        loop {
            yield next;
            next = next.wrapping_add(1);
        }
    })
}

/// Yields the Fibonacci numbers starting from `1, 1, 2, 3, 5`.
/// The sequence wraps around on overflow.
pub fn fibonacci() -> Generator<u64> {
    Generator::new(#[coroutine] static || {
        let (mut a, mut b) = (0u64, 1u64);
        loop {
            yield b;
            let next = a.wrapping_add(b);
            a = mem::replace(&mut b, next);
        }
    })
}
