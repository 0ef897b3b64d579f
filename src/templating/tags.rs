//! ARX tag scanning and phase-aware substitution.
//!
//! Grammar:
//!
//! ```text
//! <ARX [[ expr ]] />
//! <ARX [[ expr ]] :new />
//! <ARX [[ expr ]] :do />
//! ```
//!
//! `expr` is a dotted path, `env.NAME`, or either followed by `| default`.
//! Expressions starting with `#`, `^`, `*`, `@` or `/` are structural
//! (blocks, loops, includes) and are passed through untouched.

use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

use super::env::EnvSnapshot;
use super::path::{Resolution, resolve_path};
use super::utils::value_to_string;

// The expression may not contain `]]`, so a structural opener such as
// `<ARX [[#each items]]>` can never stretch into a later tag.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<ARX\s+\[\[((?:[^\]]|\][^\]])*?)\]\]\s*(?::(new|do)\s*)?/>")
        .expect("ARX tag pattern is valid")
});

const STRUCTURAL_PREFIXES: [char; 5] = ['#', '^', '*', '@', '/'];
const ENV_PREFIX: &str = "env.";

/// Rendering phase.
///
/// As a render target, [`Phase::Any`] evaluates every tag. As a tag marker,
/// [`Phase::Any`] means the tag carries no `:new`/`:do` suffix and is
/// evaluated in every phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// No phase restriction.
    #[default]
    Any,
    /// `arx prompt new`: the template is instantiated into a prompt file.
    New,
    /// `arx prompt do`: the prompt file is executed with run-time data.
    Do,
}

impl Phase {
    /// Whether a render targeting `self` evaluates a tag marked `marker`.
    pub fn admits(self, marker: Phase) -> bool {
        self == Phase::Any || marker == Phase::Any || self == marker
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Any => write!(f, "any"),
            Phase::New => write!(f, "new"),
            Phase::Do => write!(f, "do"),
        }
    }
}

/// Error returned when parsing an unknown phase name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown phase '{0}', expected 'new' or 'do'")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches(':') {
            "" | "any" => Ok(Phase::Any),
            "new" => Ok(Phase::New),
            "do" => Ok(Phase::Do),
            other => Err(UnknownPhase(other.to_string())),
        }
    }
}

/// One well-formed tag found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Byte range of the whole tag in the scanned text.
    pub span: Range<usize>,
    /// The tag exactly as written.
    pub raw: &'a str,
    /// The expression between `[[` and `]]`, whitespace trimmed.
    pub expression: &'a str,
    /// The tag's phase marker ([`Phase::Any`] when absent).
    pub phase: Phase,
}

impl Tag<'_> {
    /// Block, loop, and include directives are not evaluated by the renderer.
    pub fn is_structural(&self) -> bool {
        self.expression.starts_with(STRUCTURAL_PREFIXES)
    }

    /// Split the expression into its key and optional default literal.
    ///
    /// The default is everything after the first `|`, trimmed, with one layer
    /// of matching `"` or `'` quotes removed. An empty default counts as none.
    pub fn key_and_default(&self) -> (&str, Option<&str>) {
        split_default(self.expression)
    }
}

/// Find every well-formed tag in `text`, left to right, non-overlapping.
///
/// Structural tags are included; check [`Tag::is_structural`].
pub fn find_tags(text: &str) -> Vec<Tag<'_>> {
    TAG_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let expression = caps.get(1)?.as_str().trim();
            let phase = match caps.get(2).map(|m| m.as_str()) {
                Some("new") => Phase::New,
                Some("do") => Phase::Do,
                _ => Phase::Any,
            };
            Some(Tag {
                span: whole.range(),
                raw: whole.as_str(),
                expression,
                phase,
            })
        })
        .collect()
}

/// Replace every resolvable variable tag admitted by `phase`.
///
/// Tags are processed once, left to right, against the original text;
/// substituted values are never rescanned. Structural tags, tags for the other
/// phase, and tags that resolve to nothing without a default are copied
/// through verbatim.
pub fn substitute_tags(
    text: &str,
    context: &Map<String, Value>,
    phase: Phase,
    env: &EnvSnapshot,
) -> String {
    let tags = find_tags(text);
    if tags.is_empty() {
        return text.to_string();
    }

    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut substituted = 0usize;
    let mut preserved = 0usize;

    for tag in &tags {
        output.push_str(&text[cursor..tag.span.start]);
        cursor = tag.span.end;

        if tag.is_structural() {
            tracing::trace!("Passing through structural tag {}", tag.raw);
            output.push_str(tag.raw);
            preserved += 1;
            continue;
        }

        if !phase.admits(tag.phase) {
            tracing::trace!("Skipping {} tag {} in {} phase", tag.phase, tag.raw, phase);
            output.push_str(tag.raw);
            preserved += 1;
            continue;
        }

        match evaluate(tag, context, env) {
            Some(value) => {
                output.push_str(&value);
                substituted += 1;
            }
            None => {
                tracing::trace!("Leaving unresolved tag {}", tag.raw);
                output.push_str(tag.raw);
                preserved += 1;
            }
        }
    }

    output.push_str(&text[cursor..]);

    tracing::debug!(
        "ARX {} phase: {} tag(s) substituted, {} left as written",
        phase,
        substituted,
        preserved
    );
    output
}

/// Evaluate a variable tag; `None` means the tag must be kept as written.
fn evaluate(tag: &Tag<'_>, context: &Map<String, Value>, env: &EnvSnapshot) -> Option<String> {
    let (key, default) = tag.key_and_default();

    if let Some(name) = key.strip_prefix(ENV_PREFIX) {
        return env.get(name).map(str::to_string).or_else(|| default.map(str::to_string));
    }

    match resolve_path(key, context) {
        Resolution::Found(value) if !value.is_null() => Some(value_to_string(value)),
        _ => default.map(str::to_string),
    }
}

fn split_default(expression: &str) -> (&str, Option<&str>) {
    let Some((key, default)) = expression.split_once('|') else {
        return (expression.trim(), None);
    };

    let default = default.trim();
    if default.is_empty() {
        return (key.trim(), None);
    }
    (key.trim(), Some(strip_quotes(default)))
}

fn strip_quotes(literal: &str) -> &str {
    for quote in ['"', '\''] {
        if literal.len() >= 2 && literal.starts_with(quote) && literal.ends_with(quote) {
            return &literal[1..literal.len() - 1];
        }
    }
    literal
}
