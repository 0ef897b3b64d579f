//! AgentRx - ARX prompt templating for coding agents
//!
//! AgentRx keeps agent prompts as Markdown files with lightweight ARX tags.
//! A prompt is rendered in two phases so that values known when the prompt is
//! written and values only known when it is run can live in the same file.
//!
//! # Architecture Overview
//!
//! - Templates are Markdown with optional YAML front matter
//! - `<ARX [[ expr ]] />` tags are replaced from a JSON-like context
//! - Tags marked `:new` resolve when a prompt is created from a template,
//!   tags marked `:do` when the prompt is executed, unmarked tags in both
//! - Anything that cannot be resolved is left in place, byte for byte, for
//!   the next phase or the next tool
//!
//! # Core Modules
//!
//! - [`templating`] - Tag grammar, phases, environment expansion, rendering,
//!   context building
//! - [`markdown`] - Front matter extraction and Markdown file discovery
//! - [`prompts`] - The `new` and `do` prompt workflows, listing, template
//!   lookup, context scripts
//! - [`config`] - Directory and timeout settings read from the environment
//! - [`core`] - Error types and user-facing error reporting
//!
//! # Template Format
//!
//! ```markdown
//! ---
//! subdir: reviews
//! script: ./tools/git_context.sh
//! ---
//! # Review: <ARX [[prompt]] :new />
//!
//! Author: <ARX [[env.USER | "unknown"]] />
//! Branch: <ARX [[git.branch]] :new />
//! Findings for run <ARX [[run.id]] :do />:
//! <ARX [[run.findings | "none yet"]] :do />
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use agentrx::templating::{EnvSnapshot, build_context, render};
//!
//! let ctx = build_context(Some(r#"{"user": {"name": "Ann"}}"#), None, None)?;
//! let env = EnvSnapshot::empty();
//!
//! assert_eq!(render("Hi <ARX [[user.name]] />", &ctx, &env), "Hi Ann");
//! assert_eq!(render("<ARX [[missing]] />", &ctx, &env), "<ARX [[missing]] />");
//! # Ok::<(), agentrx::core::ArxError>(())
//! ```

pub mod config;
pub mod core;
pub mod markdown;
pub mod prompts;
pub mod templating;

// Test utilities (only compiled in test mode or with the test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
