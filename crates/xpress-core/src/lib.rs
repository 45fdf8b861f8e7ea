//! Core data structures shared by the EXPRESS schema tools.

mod interner;
mod symbol;

#[cfg(test)]
mod interner_tests;

pub use interner::{Interner, Name};
pub use symbol::{Location, Symbol};
