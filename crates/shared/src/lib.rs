//! planshift Shared Types and Utilities
//!
//! This crate contains the account and tier model plus the display
//! formatting helpers shared by the billing library and the CLI.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod error;
pub mod format;
pub mod types;

pub use error::*;
pub use format::{format_bytes, format_number, format_short_date};
pub use types::*;
