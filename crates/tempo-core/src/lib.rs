//! Core data types and sanitization for station observations
//!
//! Pure logic only: raw API values come in, canonical observations come
//! out. No I/O lives in this crate.

pub mod sanitize;
pub mod types;
pub mod units;

pub use sanitize::*;
pub use types::*;
pub use units::*;
