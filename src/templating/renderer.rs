//! Template rendering entry points.
//!
//! [`TemplateRenderer`] owns the environment snapshot used for `$NAME`
//! expansion and `env.` expressions, and runs the two text passes in order:
//! environment expansion, then phase-aware tag substitution. The free
//! functions [`render`], [`render_with_phase`] and [`render_file`] are thin
//! wrappers for one-off calls.

use std::path::Path;

use super::context::Context;
use super::env::{EnvSnapshot, expand_env};
use super::tags::{Phase, substitute_tags};
use crate::core::{ArxError, Result};
use crate::markdown::{FrontMatter, extract_front_matter};

/// Result of rendering a template file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTemplate {
    /// Parsed front matter, exactly as read from the file.
    ///
    /// `None` when the file has no front matter block. A block that failed
    /// to parse is reported as an empty mapping.
    pub front_matter: Option<FrontMatter>,
    /// The rendered body, front matter stripped.
    pub body: String,
}

impl RenderedTemplate {
    /// Split into `(front_matter, body)`.
    pub fn into_parts(self) -> (Option<FrontMatter>, String) {
        (self.front_matter, self.body)
    }

    /// String value of a front matter key, if present.
    pub fn front_matter_str(&self, key: &str) -> Option<&str> {
        self.front_matter.as_ref()?.get(key)?.as_str()
    }
}

/// Renderer for ARX templates.
///
/// Rendering is pure given the context and the environment snapshot, so a
/// single renderer can be shared freely between threads.
///
/// # Examples
///
/// ```rust
/// use agentrx::templating::{EnvSnapshot, Phase, TemplateRenderer};
/// use serde_json::json;
///
/// let renderer = TemplateRenderer::new(EnvSnapshot::empty().with_var("FOO", "bar"));
/// let ctx = json!({"name": "Ann"}).as_object().cloned().unwrap_or_default();
///
/// let out = renderer.render_phase("$FOO <ARX [[name]] :do />", &ctx, Phase::Do);
/// assert_eq!(out, "bar Ann");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    env: EnvSnapshot,
}

impl TemplateRenderer {
    /// Create a renderer that resolves environment references from `env`.
    #[must_use]
    pub fn new(env: EnvSnapshot) -> Self {
        Self {
            env,
        }
    }

    /// Create a renderer over a snapshot of the current process environment.
    #[must_use]
    pub fn from_process_env() -> Self {
        Self::new(EnvSnapshot::capture())
    }

    /// The environment snapshot in use.
    pub fn env(&self) -> &EnvSnapshot {
        &self.env
    }

    /// Render `text` with every tag eligible, whatever its phase marker.
    pub fn render(&self, text: &str, context: &Context) -> String {
        self.render_phase(text, context, Phase::Any)
    }

    /// Render `text` for `phase`.
    ///
    /// Environment references are expanded first, then ARX tags are
    /// substituted. Tags marked for the other phase, structural tags and
    /// unresolvable tags come through unchanged.
    pub fn render_phase(&self, text: &str, context: &Context, phase: Phase) -> String {
        let expanded = expand_env(text, &self.env);
        substitute_tags(&expanded, context, phase, &self.env)
    }

    /// Read `path`, strip its front matter and render the body for `phase`.
    ///
    /// The file is only read. Front matter is returned as parsed and is not
    /// consulted for substitution.
    ///
    /// # Errors
    ///
    /// - [`ArxError::TemplateNotFound`] if `path` does not exist
    /// - [`ArxError::TemplateReadFailed`] for any other I/O failure
    /// - [`ArxError::TemplateNotText`] if the file is not UTF-8
    pub fn render_file(
        &self,
        path: &Path,
        context: &Context,
        phase: Phase,
    ) -> Result<RenderedTemplate> {
        let raw = decode_template(path, std::fs::read(path))?;
        Ok(self.render_source(path, &raw, context, phase))
    }

    /// Same as [`render_file`](Self::render_file), reading through `tokio::fs`.
    ///
    /// # Errors
    ///
    /// The same errors as [`render_file`](Self::render_file).
    pub async fn render_file_async(
        &self,
        path: &Path,
        context: &Context,
        phase: Phase,
    ) -> Result<RenderedTemplate> {
        let raw = decode_template(path, tokio::fs::read(path).await)?;
        Ok(self.render_source(path, &raw, context, phase))
    }

    fn render_source(
        &self,
        path: &Path,
        raw: &str,
        context: &Context,
        phase: Phase,
    ) -> RenderedTemplate {
        let parsed = extract_front_matter(raw);

        if parsed.has_frontmatter() {
            tracing::debug!("Stripped front matter from {}", path.display());
        }
        tracing::debug!("Rendering {} for {} phase", path.display(), phase);

        let body = self.render_phase(&parsed.content, context, phase);
        RenderedTemplate {
            front_matter: parsed.data,
            body,
        }
    }
}

fn decode_template(path: &Path, read: std::io::Result<Vec<u8>>) -> Result<String> {
    let bytes = read.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ArxError::TemplateNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ArxError::TemplateReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    })?;

    String::from_utf8(bytes).map_err(|_| ArxError::TemplateNotText {
        path: path.to_path_buf(),
    })
}

/// Render `text` with every tag eligible.
pub fn render(text: &str, context: &Context, env: &EnvSnapshot) -> String {
    render_with_phase(text, context, Phase::Any, env)
}

/// Render `text` for `phase`.
pub fn render_with_phase(text: &str, context: &Context, phase: Phase, env: &EnvSnapshot) -> String {
    let expanded = expand_env(text, env);
    substitute_tags(&expanded, context, phase, env)
}

/// Render the template at `path` for `phase`.
///
/// Returns `(front_matter, rendered_body)`; see [`TemplateRenderer::render_file`].
pub fn render_file(
    path: &Path,
    context: &Context,
    phase: Phase,
    env: &EnvSnapshot,
) -> Result<(Option<FrontMatter>, String)> {
    TemplateRenderer::new(env.clone())
        .render_file(path, context, phase)
        .map(RenderedTemplate::into_parts)
}
