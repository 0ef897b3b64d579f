//! Error handling for AgentRx
//!
//! This module provides the typed error enum shared by the renderer, the
//! context builder and the prompt workflows, plus user-friendly reporting for
//! whatever front end sits on top of the library.
//!
//! # Architecture
//!
//! - [`ArxError`] - Enumerated error types for every hard failure in AgentRx
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! Two situations are deliberately *not* errors: a tag that cannot be resolved
//! is left verbatim in the output, and a front matter block that fails to parse
//! degrades to an empty mapping. Everything else surfaces here with enough
//! context (path, data source) to build a message for the user.
//!
//! # Examples
//!
//! ```rust,no_run
//! use agentrx::core::{ArxError, user_friendly_error};
//! use std::path::PathBuf;
//!
//! let error = ArxError::TemplateNotFound {
//!     path: PathBuf::from("prompts/missing.md"),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::templating::DataSource;

/// The main error type for AgentRx operations.
///
/// Each variant names one failure mode and carries the path or source label
/// that caused it.
///
/// # Error Categories
///
/// ## Template files
/// - [`TemplateNotFound`] - The template path does not exist
/// - [`TemplateReadFailed`] - The file exists but could not be read
/// - [`TemplateNotText`] - The file is not valid UTF-8 text
///
/// ## Data sources
/// - [`DataSourceNotFound`] - A data file named on the command line is missing
/// - [`DataSourceInvalid`] - A data source is not valid JSON/YAML
/// - [`DataSourceNotObject`] - A data source parsed, but not to a mapping
///
/// ## Prompt workflows
/// - [`PromptsDirNotFound`], [`NoPromptFiles`], [`PromptFileNotFound`]
/// - [`TemplateLookupFailed`], [`MissingPromptInput`]
///
/// ## Context scripts
/// - [`ContextScriptNotFound`], [`ContextScriptTimeout`],
///   [`ContextScriptFailed`], [`ContextScriptInvalidOutput`]
///
/// [`TemplateNotFound`]: ArxError::TemplateNotFound
/// [`TemplateReadFailed`]: ArxError::TemplateReadFailed
/// [`TemplateNotText`]: ArxError::TemplateNotText
/// [`DataSourceNotFound`]: ArxError::DataSourceNotFound
/// [`DataSourceInvalid`]: ArxError::DataSourceInvalid
/// [`DataSourceNotObject`]: ArxError::DataSourceNotObject
/// [`PromptsDirNotFound`]: ArxError::PromptsDirNotFound
/// [`NoPromptFiles`]: ArxError::NoPromptFiles
/// [`PromptFileNotFound`]: ArxError::PromptFileNotFound
/// [`TemplateLookupFailed`]: ArxError::TemplateLookupFailed
/// [`MissingPromptInput`]: ArxError::MissingPromptInput
/// [`ContextScriptNotFound`]: ArxError::ContextScriptNotFound
/// [`ContextScriptTimeout`]: ArxError::ContextScriptTimeout
/// [`ContextScriptFailed`]: ArxError::ContextScriptFailed
/// [`ContextScriptInvalidOutput`]: ArxError::ContextScriptInvalidOutput
#[derive(Error, Debug, Clone)]
pub enum ArxError {
    /// Template file does not exist
    #[error("Template file not found: {}", path.display())]
    TemplateNotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Template file exists but reading it failed
    ///
    /// Permission problems, the path being a directory, and similar I/O
    /// failures end up here. A missing file is reported as
    /// [`ArxError::TemplateNotFound`] instead.
    #[error("Failed to read template {}: {reason}", path.display())]
    TemplateReadFailed {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying I/O error message
        reason: String,
    },

    /// Template file is not UTF-8 text
    #[error("Template is not valid UTF-8 text: {}", path.display())]
    TemplateNotText {
        /// Path of the binary or mis-encoded file
        path: PathBuf,
    },

    /// A data file passed to the context builder does not exist
    #[error("Data source not found: {data_source}")]
    DataSourceNotFound {
        /// The missing source
        data_source: DataSource,
    },

    /// A data source could not be decoded
    #[error("Invalid {format} from {data_source}: {reason}")]
    DataSourceInvalid {
        /// Which source failed
        data_source: DataSource,
        /// `JSON` or `YAML`
        format: String,
        /// Decoder error message
        reason: String,
    },

    /// A data source decoded to something other than a mapping
    #[error("Expected a JSON object from {data_source}, found {found}")]
    DataSourceNotObject {
        /// Which source failed
        data_source: DataSource,
        /// Kind of value that was found instead (`array`, `string`, ...)
        found: String,
    },

    /// Prompts directory is missing
    #[error("Prompts directory not found: {}", path.display())]
    PromptsDirNotFound {
        /// Directory that was searched
        path: PathBuf,
    },

    /// Prompts directory contains no `.md` files
    #[error("No prompt files found in {}", path.display())]
    NoPromptFiles {
        /// Directory that was searched
        path: PathBuf,
    },

    /// Explicit prompt file does not exist
    #[error("Prompt file not found: {}", path.display())]
    PromptFileNotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Named template could not be located
    #[error("Template not found: '{name}'")]
    TemplateLookupFailed {
        /// Name or path given by the caller
        name: String,
        /// Directories that were searched
        searched: Vec<PathBuf>,
        /// Near-miss template names found in the searched directories
        suggestions: Vec<String>,
    },

    /// Neither a template nor prompt text was supplied
    #[error("Provide a template and/or prompt text")]
    MissingPromptInput,

    /// Context script executable was not found
    #[error("Context script not found: {script}")]
    ContextScriptNotFound {
        /// Script path from front matter
        script: String,
    },

    /// Context script ran past its deadline and was killed
    #[error("Context script timed out ({seconds} s): {script}")]
    ContextScriptTimeout {
        /// Script path from front matter
        script: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// Context script exited unsuccessfully
    #[error("Context script exited {}: {stderr}", code.map_or_else(|| "by signal".to_string(), |c| c.to_string()))]
    ContextScriptFailed {
        /// Script path from front matter
        script: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Trimmed stderr output
        stderr: String,
    },

    /// Context script printed something other than a JSON object
    #[error("Context script returned non-JSON output ({script}): {reason}")]
    ContextScriptInvalidOutput {
        /// Script path from front matter
        script: String,
        /// Why the output was rejected
        reason: String,
    },

    /// File system operation failed
    #[error("File system error during {operation}: {}: {reason}", path.display())]
    FileSystemError {
        /// Operation that failed (e.g. "write prompt", "create directory")
        operation: String,
        /// Path involved
        path: PathBuf,
        /// Underlying error message
        reason: String,
    },
}

impl ArxError {
    /// Build a [`ArxError::FileSystemError`] from an I/O error.
    pub fn file_system(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        error: &std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            operation: operation.into(),
            path: path.into(),
            reason: error.to_string(),
        }
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// # Examples
///
/// ```rust,no_run
/// use agentrx::core::{ArxError, ErrorContext};
///
/// let context = ErrorContext::new(ArxError::MissingPromptInput)
///     .with_suggestion("Pass a template name, prompt text, or both")
///     .with_details("Without either there is nothing to write");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying AgentRx error
    pub error: ArxError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ArxError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error with colors to stderr.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Attach suggestions to a known [`ArxError`].
#[must_use]
pub fn create_error_context(error: ArxError) -> ErrorContext {
    let (suggestion, details): (Option<String>, Option<String>) = match &error {
        ArxError::TemplateNotFound {
            ..
        }
        | ArxError::PromptFileNotFound {
            ..
        } => (
            Some("Check the path, or pass a name relative to the prompts directory".into()),
            None,
        ),
        ArxError::TemplateNotText {
            ..
        } => (
            None,
            Some("Templates are read as UTF-8 text; binary files cannot be rendered".into()),
        ),
        ArxError::DataSourceInvalid {
            data_source,
            ..
        }
        | ArxError::DataSourceNotObject {
            data_source,
            ..
        } => (
            Some("Validate the data, e.g. `echo '{\"key\": \"value\"}'`".into()),
            Some(format!("Only a top-level mapping from {data_source} can be merged")),
        ),
        ArxError::DataSourceNotFound {
            ..
        } => (Some("Check the --data-file path".into()), None),
        ArxError::PromptsDirNotFound {
            ..
        } => (Some("Set ARX_PROMPTS or specify a prompt file explicitly".into()), None),
        ArxError::NoPromptFiles {
            ..
        } => (Some("Create one with `arx prompt new`".into()), None),
        ArxError::TemplateLookupFailed {
            searched,
            suggestions,
            ..
        } => {
            let searched = searched
                .iter()
                .map(|dir| dir.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let suggestion = if suggestions.is_empty() {
                "Set ARX_AGENT_TOOLS or AGENTRX_SOURCE to a directory containing templates/"
                    .to_string()
            } else {
                format!("Did you mean: {}?", suggestions.join(", "))
            };
            (Some(suggestion), Some(format!("Searched: [{searched}]")))
        }
        ArxError::ContextScriptNotFound {
            ..
        } => (Some("Check the `script` path in the template front matter".into()), None),
        ArxError::ContextScriptTimeout {
            ..
        } => (Some("Raise ARX_SCRIPT_TIMEOUT or make the script faster".into()), None),
        ArxError::ContextScriptFailed {
            ..
        }
        | ArxError::ContextScriptInvalidOutput {
            ..
        } => (
            None,
            Some(
                "Context scripts read the context JSON on stdin and must print a JSON object on stdout"
                    .into(),
            ),
        ),
        _ => (None, None),
    };

    ErrorContext {
        error,
        suggestion,
        details,
    }
}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Known [`ArxError`]s get tailored suggestions; I/O errors are mapped to a
/// [`ArxError::FileSystemError`]; anything else keeps its message.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(arx_error) = error.downcast_ref::<ArxError>() {
        return create_error_context(arx_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(ArxError::file_system("file access", "unknown", io_error))
            .with_suggestion("Check that the file or directory exists and is accessible");
    }

    ErrorContext::new(ArxError::FileSystemError {
        operation: "operation".to_string(),
        path: PathBuf::new(),
        reason: format!("{error:#}"),
    })
}
