//! Front matter extraction.
//!
//! A front matter block is recognised only at the very start of a document:
//! a line consisting of exactly `---`, at least one line of YAML, and a closing
//! `---` line. Either delimiter may carry a trailing `\r`.
//!
//! # Example
//!
//! ```rust
//! use agentrx::markdown::frontmatter::extract_front_matter;
//!
//! let parsed = extract_front_matter("---\nsubdir: reviews\n---\n# Body\n");
//! assert!(parsed.has_frontmatter());
//! assert_eq!(parsed.content, "# Body\n");
//! assert_eq!(parsed.data.unwrap()["subdir"], "reviews");
//! ```
//!
//! Parsing never fails. A detected block whose content is not a YAML mapping
//! yields an empty mapping and leaves the document text untouched, so the
//! caller can still see what was written.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Parsed front matter: string keys to structured values.
pub type FrontMatter = Map<String, Value>;

static FRONT_MATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---\r?\n(.+?)\r?\n---\r?(?:\n|\z)").expect("front matter pattern is valid")
});

/// Result of splitting a document into front matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFrontmatter {
    /// The parsed mapping.
    ///
    /// `None` when the document has no front matter block; an empty mapping
    /// when a block was found but did not parse as a mapping.
    pub data: Option<FrontMatter>,

    /// The body text. Excludes the front matter block (delimiters and the
    /// newline after the closing `---` included) when it parsed; the original
    /// text otherwise.
    pub content: String,

    /// The raw YAML between the delimiters, if a block was detected.
    pub raw_frontmatter: Option<String>,

    /// Byte boundaries of the block in the original text, if detected.
    pub boundaries: Option<FrontmatterBoundaries>,
}

/// Byte boundaries of the front matter section, delimiters included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontmatterBoundaries {
    /// Byte position of the opening `---` (always 0).
    pub start: usize,

    /// Byte position just past the closing delimiter and its newline.
    pub end: usize,
}

impl ParsedFrontmatter {
    /// Check if a front matter block was present in the original content.
    pub fn has_frontmatter(&self) -> bool {
        self.raw_frontmatter.is_some()
    }

    /// Look up a string field in the front matter.
    ///
    /// Non-string values and missing keys both return `None`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

/// Split `text` into front matter and body.
pub fn extract_front_matter(text: &str) -> ParsedFrontmatter {
    let Some(captures) = FRONT_MATTER_RE.captures(text) else {
        return ParsedFrontmatter {
            data: None,
            content: text.to_string(),
            raw_frontmatter: None,
            boundaries: None,
        };
    };

    // Group 0 always exists for a successful match; group 1 is mandatory in the pattern.
    let (Some(whole), Some(block)) = (captures.get(0), captures.get(1)) else {
        return ParsedFrontmatter {
            data: None,
            content: text.to_string(),
            raw_frontmatter: None,
            boundaries: None,
        };
    };

    let raw = block.as_str().to_string();
    let boundaries = FrontmatterBoundaries {
        start: whole.start(),
        end: whole.end(),
    };

    match parse_mapping(&raw) {
        Some(data) => {
            tracing::debug!("Front matter detected with {} key(s)", data.len());
            ParsedFrontmatter {
                data: Some(data),
                content: text[boundaries.end..].to_string(),
                raw_frontmatter: Some(raw),
                boundaries: Some(boundaries),
            }
        }
        None => ParsedFrontmatter {
            data: Some(FrontMatter::new()),
            content: text.to_string(),
            raw_frontmatter: Some(raw),
            boundaries: Some(boundaries),
        },
    }
}

/// Parse a YAML block as a string-keyed mapping.
///
/// An empty document counts as an empty mapping.
fn parse_mapping(raw: &str) -> Option<FrontMatter> {
    let value: serde_yaml::Value = match serde_yaml::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Unable to parse YAML front matter, ignoring it: {}", e);
            return None;
        }
    };

    match value {
        serde_yaml::Value::Null => Some(FrontMatter::new()),
        serde_yaml::Value::Mapping(_) => match serde_yaml::from_value::<FrontMatter>(value) {
            Ok(map) => Some(map),
            Err(e) => {
                tracing::warn!("Front matter is not a string-keyed mapping, ignoring it: {}", e);
                None
            }
        },
        other => {
            tracing::warn!("Front matter is not a mapping ({:?}), ignoring it", other);
            None
        }
    }
}
