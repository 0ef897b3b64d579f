//! Markdown prompt and template files.
//!
//! Prompt files and templates are plain Markdown, optionally headed by a YAML
//! front matter block:
//!
//! ```markdown
//! ---
//! subdir: reviews
//! short_name: auth_review
//! script: ./tools/git_context.sh
//! ---
//! # Review <ARX [[ticket]] />
//!
//! Branch: <ARX [[git.branch | "main"]] :new />
//! ```
//!
//! [`frontmatter`] splits such a document into its metadata mapping and body;
//! the helpers here find Markdown files on disk.

pub mod frontmatter;

pub use frontmatter::{FrontMatter, FrontmatterBoundaries, ParsedFrontmatter, extract_front_matter};

use std::path::{Path, PathBuf};

/// List the `*.md` files directly inside `dir` (no recursion).
///
/// Returns an empty list when the directory does not exist. Entries that
/// cannot be read are skipped.
pub fn list_markdown_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let pattern = format!("{}/*.md", glob::Pattern::escape(&dir.to_string_lossy()));
    match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).filter(|path| path.is_file()).collect(),
        Err(e) => {
            tracing::warn!("Invalid glob pattern '{}': {}", pattern, e);
            Vec::new()
        }
    }
}
