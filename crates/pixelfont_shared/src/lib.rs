//! Shared functionality
//!
//! Types that are used by every pixelfont crate: the result and error types, simple
//! geometry and the character range that the pipeline enumerates.

pub mod charset;
pub mod types;
