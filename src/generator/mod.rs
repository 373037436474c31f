//! This module contains [`Generator`] and a few sequences built on it.
pub mod generator;
pub mod sequences;

pub use generator::*;
pub use sequences::*;
