//! Finding and listing prompt files.

use chrono::{DateTime, Local, TimeDelta};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::ArxConfig;
use crate::core::{ArxError, Result};
use crate::markdown::list_markdown_files;

/// One prompt file in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct PromptEntry {
    /// Full path to the file
    pub path: PathBuf,
    /// File name only
    pub name: String,
    /// Last modification time
    pub modified: DateTime<Local>,
    /// Humanised age, e.g. `3h ago`
    pub age: String,
}

/// Recent prompts in a directory, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct PromptListing {
    /// Directory that was listed
    pub dir: PathBuf,
    /// Up to `limit` entries, newest first
    pub entries: Vec<PromptEntry>,
    /// Number of prompt files in the directory, before truncation
    pub total: usize,
}

impl PromptListing {
    /// Number of files not shown because of the limit.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.entries.len())
    }
}

impl fmt::Display for PromptListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return write!(f, "No prompt files in {}", self.dir.display());
        }

        writeln!(f, "Recent prompts in {}:", self.dir.display())?;
        for (i, entry) in self.entries.iter().enumerate() {
            let marker = if i == 0 { '*' } else { ' ' };
            writeln!(f, "  {marker} {} ({})", entry.name, entry.age)?;
        }
        if self.remaining() > 0 {
            writeln!(f, "  ... and {} more", self.remaining())?;
        }
        Ok(())
    }
}

/// Markdown files in `dir` with their modification times, newest first.
fn prompts_by_recency(dir: &Path) -> Vec<(PathBuf, SystemTime)> {
    let mut files: Vec<_> = list_markdown_files(dir)
        .into_iter()
        .filter_map(|path| {
            let modified = std::fs::metadata(&path).and_then(|m| m.modified());
            match modified {
                Ok(time) => Some((path, time)),
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect();

    files.sort_by(|a, b| b.1.cmp(&a.1));
    files
}

/// Most recently modified `*.md` file directly inside `dir`.
///
/// Returns `None` when the directory is missing or holds no prompts.
pub fn find_most_recent_prompt(dir: &Path) -> Option<PathBuf> {
    prompts_by_recency(dir).into_iter().next().map(|(path, _)| path)
}

/// List up to `limit` prompt files in `dir`, newest first.
///
/// # Errors
///
/// [`ArxError::PromptsDirNotFound`] when `dir` does not exist.
pub fn list_prompts(dir: &Path, limit: usize) -> Result<PromptListing> {
    if !dir.is_dir() {
        return Err(ArxError::PromptsDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let files = prompts_by_recency(dir);
    let total = files.len();
    let now = Local::now();

    let entries = files
        .into_iter()
        .take(limit)
        .map(|(path, time)| {
            let modified = DateTime::<Local>::from(time);
            PromptEntry {
                name: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                age: format_age(now.signed_duration_since(modified)),
                modified,
                path,
            }
        })
        .collect();

    Ok(PromptListing {
        dir: dir.to_path_buf(),
        entries,
        total,
    })
}

/// Format an age as `Nd ago`, `Nh ago` or `Nm ago`.
///
/// Whole days win; otherwise hours once the age exceeds one hour, minutes
/// below that. Negative ages (clock skew) count as zero.
///
/// ```rust
/// use agentrx::prompts::format_age;
/// use chrono::TimeDelta;
///
/// assert_eq!(format_age(TimeDelta::days(2)), "2d ago");
/// assert_eq!(format_age(TimeDelta::minutes(90)), "1h ago");
/// assert_eq!(format_age(TimeDelta::minutes(5)), "5m ago");
/// ```
pub fn format_age(age: TimeDelta) -> String {
    let age = age.max(TimeDelta::zero());
    let days = age.num_days();
    if days > 0 {
        return format!("{days}d ago");
    }

    let seconds = age.num_seconds();
    if seconds > 3600 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}m ago", seconds / 60)
    }
}

/// Resolve the prompt file to execute.
///
/// An explicit argument is used as given unless it is relative, missing, and
/// exists under the prompts directory. Without an argument the most recent
/// prompt in the prompts directory is chosen. The returned path is not
/// checked for existence when it came from an explicit argument.
///
/// # Errors
///
/// - [`ArxError::PromptsDirNotFound`] when no argument is given and the
///   prompts directory is missing
/// - [`ArxError::NoPromptFiles`] when the prompts directory holds no prompts
pub fn resolve_prompt_path(prompt: Option<&str>, config: &ArxConfig) -> Result<PathBuf> {
    let prompts_dir = &config.prompts_dir;

    if let Some(prompt) = prompt {
        let path = PathBuf::from(prompt);
        if !path.is_absolute() && !path.exists() {
            let candidate = prompts_dir.join(prompt);
            if candidate.exists() {
                tracing::debug!("Resolved prompt '{}' to {}", prompt, candidate.display());
                return Ok(candidate);
            }
        }
        return Ok(path);
    }

    if !prompts_dir.is_dir() {
        return Err(ArxError::PromptsDirNotFound {
            path: prompts_dir.clone(),
        });
    }

    let path = find_most_recent_prompt(prompts_dir).ok_or_else(|| ArxError::NoPromptFiles {
        path: prompts_dir.clone(),
    })?;
    tracing::debug!("Using most recent prompt {}", path.display());
    Ok(path)
}
