//! Fair rotation assignment engine.
//!
//! Pure functions over an in-memory roster snapshot. The HTTP layer loads the
//! snapshot, runs the shuffle, and persists the result; nothing here touches
//! the database or the clock.

pub mod shuffle;

pub use shuffle::{
    already_shuffled_on, display_labels, history_rows, is_weekend, shuffle_assignments, Snapshot,
};
