//! Table cleaning for Stage 2.
//!
//! This module provides:
//! - Sentinel normalization (survey "no answer" values to null)
//! - Duplicate column detection and removal
//! - Constant column removal with a protected set

mod reducer;
mod sanitizers;

pub use reducer::{
    DuplicatePair, drop_constant_columns, drop_duplicate_columns, find_constant_columns,
    find_duplicate_columns,
};
pub use sanitizers::replace_sentinels;
