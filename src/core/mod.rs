//! Core types for AgentRx
//!
//! This module holds the error model shared by every other module.
//!
//! ## Error Management
//! - **Strongly-typed errors** ([`ArxError`]) for precise error handling in code
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions
//! - [`user_friendly_error`] converts any `anyhow::Error` into an [`ErrorContext`]
//!
//! The renderer itself has only two soft-failure paths (unresolved tags and
//! malformed front matter); every other failure is an [`ArxError`] variant
//! naming the path or data source at fault.

pub mod error;

pub use error::{ArxError, ErrorContext, create_error_context, user_friendly_error};

/// Result alias used across the crate.
pub type Result<T, E = ArxError> = std::result::Result<T, E>;
