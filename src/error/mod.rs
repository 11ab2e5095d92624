//! Network error classification module
//!
//! This module turns the nested, platform-specific errors produced by HTTP and
//! socket operations into one of a small set of actionable categories. It
//! supports structured error chains built from [`chain`] types as well as
//! errors coming straight out of `reqwest` and `hyper`.

pub mod chain;
pub mod classification;
pub mod classifier;
mod shape;

// Re-export main types for convenient access
pub use chain::{OpError, RequestError, SyscallError};
pub use classification::{BasicError, BasicErrorType, BoxError, ParseCategoryError};
pub use classifier::{
    category_of, classify, is_connection_error, HTTP_MALFORMED_PREFIX, TRANSPORT_CLOSED,
};
