//! Mood/sleep analytics engine and the store adapter feeding it.
//!
//! Everything here except [`entry_store`] is a pure function of its inputs;
//! the current date is always passed in.

pub mod correlation;
pub mod entry_store;
pub mod export;
pub mod stats;
pub mod streaks;
pub mod summary;
pub mod tags;
