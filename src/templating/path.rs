//! Dotted-path lookup into a rendering context.

use serde_json::{Map, Value};

/// Outcome of resolving a dotted path.
///
/// [`Resolution::Found`] may carry `Value::Null`: a key that is present with
/// a null value is distinct from a key that is absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// The path led to a value.
    Found(&'a Value),
    /// Some segment was missing, out of range, or applied to a scalar.
    Unresolved,
}

impl<'a> Resolution<'a> {
    /// The resolved value, if any.
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Resolution::Found(value) => Some(value),
            Resolution::Unresolved => None,
        }
    }

    /// Whether the path resolved (possibly to null).
    pub fn is_found(self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Resolve `key` (e.g. `user.profile.0.name`) against `context`.
///
/// Segments are applied left to right. On a mapping the segment is a key; on
/// a sequence it must parse as an integer index, negative indices counting
/// from the end. Any other node ends the walk as unresolved.
///
/// # Examples
///
/// ```rust
/// use agentrx::templating::{Resolution, resolve_path};
/// use serde_json::json;
///
/// let ctx = json!({"user": {"tags": ["x", "y"]}});
/// let ctx = ctx.as_object().unwrap();
/// assert_eq!(resolve_path("user.tags.1", ctx), Resolution::Found(&json!("y")));
/// assert_eq!(resolve_path("user.tags.9", ctx), Resolution::Unresolved);
/// ```
pub fn resolve_path<'a>(key: &str, context: &'a Map<String, Value>) -> Resolution<'a> {
    let mut segments = key.split('.');

    let Some(mut node) = segments.next().and_then(|first| context.get(first)) else {
        return Resolution::Unresolved;
    };

    for segment in segments {
        let next = match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => index(items, segment),
            _ => None,
        };
        match next {
            Some(value) => node = value,
            None => return Resolution::Unresolved,
        }
    }

    Resolution::Found(node)
}

fn index<'a>(items: &'a [Value], segment: &str) -> Option<&'a Value> {
    let idx: i64 = segment.parse().ok()?;
    let len = i64::try_from(items.len()).ok()?;
    let idx = if idx < 0 {
        idx + len
    } else {
        idx
    };
    if !(0..len).contains(&idx) {
        return None;
    }
    items.get(usize::try_from(idx).ok()?)
}
