//! ARX templating engine for prompt files.
//!
//! This module renders Markdown prompt templates that use ARX tags:
//!
//! ```text
//! <ARX [[ expression ]] />
//! <ARX [[ expression ]] :new />
//! <ARX [[ expression ]] :do />
//! ```
//!
//! # Processing Order
//!
//! 1. Strip the YAML front matter block (returned separately, never merged
//!    into the rendering context).
//! 2. Expand `$NAME` and `${NAME}` from the environment snapshot. Unset
//!    variables are left as written.
//! 3. Substitute ARX variable tags from the context, honouring the tag phase.
//!
//! # Expressions
//!
//! - `user.profile.name` - dotted path into the context; numeric segments
//!   index into sequences (`items.0`, `items.-1`)
//! - `env.HOME` - environment variable from the snapshot
//! - `key | "fallback"` - default used when the key cannot be resolved
//!
//! A tag whose expression cannot be resolved and has no default is left in the
//! output byte-for-byte, so a later phase, a human, or another agent can still
//! act on it. Structural tags (`#`, `^`, `*`, `@`, `/` prefixes for blocks,
//! loops and includes) are never evaluated here and always pass through.
//!
//! # Phases
//!
//! `arx prompt new` renders with [`Phase::New`] and `arx prompt do` with
//! [`Phase::Do`]. A tag marked with the other phase is skipped entirely; a tag
//! without a marker is evaluated in every phase. [`render`] uses
//! [`Phase::Any`], which evaluates every tag.
//!
//! # Examples
//!
//! ```rust
//! use agentrx::templating::{EnvSnapshot, Phase, render_with_phase};
//! use serde_json::json;
//!
//! let ctx = json!({"a": "X"}).as_object().cloned().unwrap_or_default();
//! let env = EnvSnapshot::empty();
//! let out = render_with_phase("<ARX [[a]] :new />bob<ARX [[b]] :do />", &ctx, Phase::New, &env);
//! assert_eq!(out, "Xbob<ARX [[b]] :do />");
//! ```

pub mod context;
pub mod env;
pub mod path;
pub mod renderer;
pub mod tags;
pub mod utils;


pub use context::{Context, DataSource, build_context, load_data_file, parse_json_source};
pub use env::{EnvSnapshot, expand_env};
pub use path::{Resolution, resolve_path};
pub use renderer::{RenderedTemplate, TemplateRenderer, render, render_file, render_with_phase};
pub use tags::{Phase, Tag, UnknownPhase, find_tags, substitute_tags};
pub use utils::value_to_string;
