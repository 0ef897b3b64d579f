//! Integration test suite for AgentRx
//!
//! End-to-end tests through the public API: rendering files from disk,
//! merging data sources, and the `new` -> `do` prompt lifecycle.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **rendering**: tag grammar, phases, defaults, env expansion, `render_file`
//! - **context_sources**: `build_context` precedence and error reporting
//! - **prompt_workflow**: `prompt new` followed by `prompt do`, listing, templates
//! - **error_reporting**: user-facing error messages and suggestions

mod context_sources;
mod error_reporting;
mod prompt_workflow;
mod rendering;
