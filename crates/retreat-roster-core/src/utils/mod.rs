//! Utility functions for string formatting and comparison.

pub mod format;

pub use format::{cmp_collated, format_timestamp, truncate_string};
