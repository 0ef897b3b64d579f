//! Environment snapshot and `$NAME` / `${NAME}` expansion.
//!
//! The renderer never reads the process environment directly. Callers capture
//! an [`EnvSnapshot`] once and thread it through, which keeps rendering pure
//! and lets tests supply exactly the variables they need.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

// Braced alternative first, so `${NAME}` is consumed whole before `$NAME`
// could match at the same position.
static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("env var pattern is valid")
});

/// Read-only copy of environment variables used during rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Snapshot with no variables.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    #[must_use]
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect::<HashMap<_, _>>();
        tracing::trace!("Captured {} environment variable(s)", vars.len());
        Self {
            vars,
        }
    }

    /// Return a copy with `name` set to `value`.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Whether the snapshot holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Expand `${NAME}` and `$NAME` references from `env`.
///
/// `NAME` must match `[A-Za-z_][A-Za-z0-9_]*`. References to unset variables
/// are kept exactly as written rather than replaced with an empty string.
/// The text is scanned once, so a substituted value is never expanded again.
///
/// # Examples
///
/// ```rust
/// use agentrx::templating::{EnvSnapshot, expand_env};
///
/// let env = EnvSnapshot::empty().with_var("FOO", "bar");
/// assert_eq!(expand_env("$FOO and ${FOO}", &env), "bar and bar");
/// assert_eq!(expand_env("$UNSET", &env), "$UNSET");
/// ```
pub fn expand_env(text: &str, env: &EnvSnapshot) -> String {
    if !text.contains('$') {
        return text.to_string();
    }

    ENV_VAR_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            match env.get(name) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
