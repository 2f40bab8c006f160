//! Shared utilities.

mod paths;

pub use paths::{is_c_source, is_header};
