//! Error Handling Module
//!
//! This module provides the error types surfaced by every layer of the client:
//! - Core error types (`ApiError`, `RequestError`, `ErrorCategory`)
//! - Classification helpers used to decide whether a failure is worth retrying
//!
//! Nothing in the crate retries automatically; callers inspect the error and decide.
//!
//! # Example
//!
//! ```rust,ignore
//! use dynapi::error::{ApiError, ErrorCategory};
//!
//! let error = ApiError::UnknownOperation { path: "videos.rate".into() };
//! assert_eq!(error.category(), ErrorCategory::Resolution);
//! assert!(!error.is_retryable());
//! ```

pub mod helpers;
pub mod types;

pub use helpers::*;
pub use types::*;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;
