//! The `prompt do` stage: render a prompt file with run-time data.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::PromptWorkspace;
use super::new::preview;
use crate::core::{ArxError, Result};
use crate::templating::{Context, Phase, build_context};

/// Characters of prompt and data shown in a dry-run plan.
const PREVIEW_CHARS: usize = 500;

/// Inputs for [`PromptWorkspace::do_prompt`].
#[derive(Debug, Clone, Default)]
pub struct DoPromptRequest {
    /// Prompt file; the most recent prompt when `None`.
    pub prompt: Option<String>,
    /// JSON or YAML data file.
    pub data_file: Option<PathBuf>,
    /// Inline JSON (`--data-json`), overriding the data file.
    pub data_json: Option<String>,
    /// JSON read from stdin, overriding everything else.
    pub stdin: Option<String>,
    /// Write the rendered prompt here instead of returning it for printing.
    pub output: Option<PathBuf>,
    /// Describe what would happen without rendering or writing.
    pub dry_run: bool,
}

/// What [`PromptWorkspace::do_prompt`] did.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DoPromptOutcome {
    /// The prompt was rendered.
    Rendered {
        /// Prompt file that was rendered
        prompt_path: PathBuf,
        /// Where the data came from, e.g. `ctx.json + --data-json`
        data_source: Option<String>,
        /// The rendered prompt
        body: String,
        /// File the prompt was written to; `None` means print `body`
        output: Option<PathBuf>,
    },
    /// Dry run; nothing was rendered or written.
    DryRun(DoPromptPlan),
}

impl DoPromptOutcome {
    /// Text to print on stdout: the body when it was not written to a file,
    /// or the plan for a dry run.
    pub fn stdout_text(&self) -> Option<String> {
        match self {
            DoPromptOutcome::Rendered {
                body,
                output: None,
                ..
            } => Some(body.clone()),
            DoPromptOutcome::Rendered {
                ..
            } => None,
            DoPromptOutcome::DryRun(plan) => Some(plan.to_string()),
        }
    }
}

/// Dry-run description of a `prompt do` invocation.
#[derive(Debug, Clone, Serialize)]
pub struct DoPromptPlan {
    /// Prompt file that would be rendered
    pub prompt_path: PathBuf,
    /// Where the data came from
    pub data_source: Option<String>,
    /// Top-level keys of the merged data
    pub data_keys: Vec<String>,
    /// Output file, `None` for stdout
    pub output: Option<PathBuf>,
    /// Start of the raw prompt file
    pub prompt_preview: String,
    /// Start of the merged data as pretty JSON, when there is any data
    pub data_preview: Option<String>,
}

impl fmt::Display for DoPromptPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Dry Run ===")?;
        writeln!(f, "Prompt file: {}", self.prompt_path.display())?;
        writeln!(f, "Data source: {}", self.data_source.as_deref().unwrap_or("none"))?;
        if !self.data_keys.is_empty() {
            writeln!(f, "Data keys: {:?}", self.data_keys)?;
        }
        match &self.output {
            Some(path) => writeln!(f, "Output: {}", path.display())?,
            None => writeln!(f, "Output: stdout")?,
        }
        writeln!(f)?;
        writeln!(f, "=== Prompt Content (first {PREVIEW_CHARS} chars) ===")?;
        write!(f, "{}", self.prompt_preview)?;
        if let Some(data) = &self.data_preview {
            writeln!(f)?;
            writeln!(f)?;
            writeln!(f, "=== Data Preview ===")?;
            write!(f, "{data}")?;
        }
        Ok(())
    }
}

/// Human-readable label for the data sources in use, `None` when there are none.
///
/// ```rust
/// use agentrx::prompts::data_source_label;
/// use std::path::Path;
///
/// let label = data_source_label(Some(Path::new("ctx.json")), Some("{}"), Some("{}"));
/// assert_eq!(label.as_deref(), Some("ctx.json + --data-json + stdin"));
/// assert_eq!(data_source_label(None, None, None), None);
/// ```
pub fn data_source_label(
    data_file: Option<&Path>,
    data_json: Option<&str>,
    stdin: Option<&str>,
) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(path) = data_file {
        parts.push(path.display().to_string());
    }
    if data_json.is_some_and(|raw| !raw.is_empty()) {
        parts.push("--data-json".to_string());
    }
    if stdin.is_some_and(|raw| !raw.trim().is_empty()) {
        parts.push("stdin".to_string());
    }

    if parts.is_empty() { None } else { Some(parts.join(" + ")) }
}

impl PromptWorkspace {
    /// Render a prompt file for [`Phase::Do`].
    ///
    /// Data is merged from the data file, inline JSON and stdin (stdin wins).
    /// With an `output` path the result is written there, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// - prompt resolution errors ([`ArxError::PromptsDirNotFound`],
    ///   [`ArxError::NoPromptFiles`])
    /// - [`ArxError::PromptFileNotFound`] when the prompt file is missing
    /// - data source and template read errors
    /// - [`ArxError::FileSystemError`] when the output cannot be written
    pub async fn do_prompt(&self, request: DoPromptRequest) -> Result<DoPromptOutcome> {
        let prompt_path = self.resolve_prompt_path(request.prompt.as_deref())?;
        if !prompt_path.is_file() {
            return Err(ArxError::PromptFileNotFound {
                path: prompt_path,
            });
        }

        let data = build_context(
            request.data_json.as_deref(),
            request.data_file.as_deref(),
            request.stdin.as_deref(),
        )?;
        let data_source = data_source_label(
            request.data_file.as_deref(),
            request.data_json.as_deref(),
            request.stdin.as_deref(),
        );

        if request.dry_run {
            return self.plan(prompt_path, data_source, &data, request.output).await;
        }

        tracing::debug!(
            "Executing prompt {} with data from {}",
            prompt_path.display(),
            data_source.as_deref().unwrap_or("nowhere")
        );

        let rendered = self.renderer().render_file_async(&prompt_path, &data, Phase::Do).await?;

        if let Some(output) = &request.output {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ArxError::file_system("create directory", parent, &e))?;
            }
            tokio::fs::write(output, &rendered.body)
                .await
                .map_err(|e| ArxError::file_system("write output", output, &e))?;
            tracing::info!("Output written to {}", output.display());
        }

        Ok(DoPromptOutcome::Rendered {
            prompt_path,
            data_source,
            body: rendered.body,
            output: request.output,
        })
    }

    async fn plan(
        &self,
        prompt_path: PathBuf,
        data_source: Option<String>,
        data: &Context,
        output: Option<PathBuf>,
    ) -> Result<DoPromptOutcome> {
        let content = tokio::fs::read_to_string(&prompt_path)
            .await
            .map_err(|e| ArxError::file_system("read prompt", &prompt_path, &e))?;

        let data_preview = if data.is_empty() {
            None
        } else {
            let pretty = serde_json::to_string_pretty(data).map_err(|e| {
                ArxError::FileSystemError {
                    operation: "format data preview".to_string(),
                    path: prompt_path.clone(),
                    reason: e.to_string(),
                }
            })?;
            Some(pretty.chars().take(PREVIEW_CHARS).collect())
        };

        Ok(DoPromptOutcome::DryRun(DoPromptPlan {
            data_keys: data.keys().cloned().collect(),
            prompt_preview: preview(&content, PREVIEW_CHARS),
            prompt_path,
            data_source,
            output,
            data_preview,
        }))
    }
}
