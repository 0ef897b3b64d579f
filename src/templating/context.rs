//! Rendering context assembled from caller-supplied data sources.
//!
//! Three optional sources are merged into one mapping, lowest priority first:
//!
//! 1. a data file (`.yaml`/`.yml` decoded as YAML, anything else as JSON)
//! 2. an inline JSON string (`--data`)
//! 3. JSON read from stdin
//!
//! The merge is shallow: a top-level key from a higher-priority source
//! replaces the same key from a lower one wholesale. Any malformed source
//! fails the whole build; there is no partial or empty-context fallback.

use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

use super::utils::value_kind;
use crate::core::{ArxError, Result};

/// The rendering context: a mapping of top-level keys to JSON values.
pub type Context = Map<String, Value>;

/// Where a piece of context data came from, used to label errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A JSON or YAML data file
    File(PathBuf),
    /// The inline `--data` JSON string
    Inline,
    /// JSON piped through stdin
    Stdin,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "data file '{}'", path.display()),
            DataSource::Inline => write!(f, "inline JSON (--data)"),
            DataSource::Stdin => write!(f, "stdin"),
        }
    }
}

/// Merge the optional data sources into one context.
///
/// An empty inline string and whitespace-only stdin count as absent.
///
/// # Errors
///
/// - [`ArxError::DataSourceNotFound`] when `data_file` does not exist
/// - [`ArxError::DataSourceInvalid`] when any source fails to decode
/// - [`ArxError::DataSourceNotObject`] when a source is not a mapping
///
/// # Examples
///
/// ```rust
/// use agentrx::templating::build_context;
///
/// let ctx = build_context(Some(r#"{"k": "inline"}"#), None, Some(r#"{"k": "stdin"}"#))?;
/// assert_eq!(ctx["k"], "stdin");
/// # Ok::<(), agentrx::core::ArxError>(())
/// ```
pub fn build_context(
    data_json: Option<&str>,
    data_file: Option<&Path>,
    stdin_json: Option<&str>,
) -> Result<Context> {
    let mut context = Context::new();

    if let Some(path) = data_file {
        merge_shallow(&mut context, load_data_file(path)?);
    }

    if let Some(raw) = data_json.filter(|raw| !raw.is_empty()) {
        merge_shallow(&mut context, parse_json_source(raw, DataSource::Inline)?);
    }

    if let Some(raw) = stdin_json.filter(|raw| !raw.trim().is_empty()) {
        merge_shallow(&mut context, parse_json_source(raw, DataSource::Stdin)?);
    }

    tracing::debug!("Built rendering context with {} top-level key(s)", context.len());
    Ok(context)
}

/// Load a JSON or YAML data file into a mapping.
///
/// The format is chosen by extension, case-insensitively. An empty YAML
/// document yields an empty mapping.
pub fn load_data_file(path: &Path) -> Result<Context> {
    let data_source = DataSource::File(path.to_path_buf());

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ArxError::DataSourceNotFound {
                data_source,
            });
        }
        Err(e) => {
            return Err(ArxError::DataSourceInvalid {
                data_source,
                format: "data".to_string(),
                reason: e.to_string(),
            });
        }
    };

    if is_yaml_path(path) {
        tracing::debug!("Loading YAML data from {}", path.display());
        let value: Value =
            serde_yaml::from_str(&raw).map_err(|e| ArxError::DataSourceInvalid {
                data_source: data_source.clone(),
                format: "YAML".to_string(),
                reason: e.to_string(),
            })?;
        if value.is_null() {
            return Ok(Context::new());
        }
        into_mapping(value, data_source)
    } else {
        tracing::debug!("Loading JSON data from {}", path.display());
        parse_json_source(&raw, data_source)
    }
}

/// Parse a raw JSON string from `data_source` into a mapping.
pub fn parse_json_source(raw: &str, data_source: DataSource) -> Result<Context> {
    let value: Value = serde_json::from_str(raw).map_err(|e| ArxError::DataSourceInvalid {
        data_source: data_source.clone(),
        format: "JSON".to_string(),
        reason: e.to_string(),
    })?;
    into_mapping(value, data_source)
}

fn into_mapping(value: Value, data_source: DataSource) -> Result<Context> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ArxError::DataSourceNotObject {
            data_source,
            found: value_kind(&other).to_string(),
        }),
    }
}

fn is_yaml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Overlay `overlay` onto `base`; top-level keys in `overlay` win outright.
pub(crate) fn merge_shallow(base: &mut Context, overlay: Context) {
    for (key, value) in overlay {
        base.insert(key, value);
    }
}
