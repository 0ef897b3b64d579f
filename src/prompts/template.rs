//! Template lookup for `prompt new`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use strsim::levenshtein;

use crate::config::ArxConfig;
use crate::core::{ArxError, Result};
use crate::markdown::list_markdown_files;

/// Maximum allowed Levenshtein distance as a percentage of the name length.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Resolve a template name or path to an existing file.
///
/// Resolution order:
/// 1. `name_or_path` as given
/// 2. `name_or_path` with `.md` appended, if it has no extension
/// 3. each configured template directory: `<dir>/<name>`, then `<dir>/<name>.md`
pub fn find_template(name_or_path: &str, config: &ArxConfig) -> Option<PathBuf> {
    let direct = PathBuf::from(name_or_path);
    if direct.exists() {
        return Some(direct);
    }
    if direct.extension().is_none() {
        let with_md = direct.with_extension("md");
        if with_md.exists() {
            return Some(with_md);
        }
    }

    for dir in config.template_dirs.iter().filter(|dir| dir.is_dir()) {
        for candidate in [dir.join(name_or_path), dir.join(format!("{name_or_path}.md"))] {
            if candidate.exists() {
                tracing::debug!("Found template '{}' at {}", name_or_path, candidate.display());
                return Some(candidate);
            }
        }
    }

    None
}

/// Template names in `dirs` that are close to `name`, closest first.
pub fn template_suggestions(name: &str, dirs: &[PathBuf]) -> Vec<String> {
    let available: BTreeSet<String> = dirs
        .iter()
        .flat_map(|dir| list_markdown_files(dir))
        .filter_map(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .collect();

    let mut scored: Vec<_> =
        available.into_iter().map(|candidate| (levenshtein(name, &candidate), candidate)).collect();
    scored.sort();

    let max_distance = name.chars().count() * SIMILARITY_THRESHOLD_PERCENT / 100;
    scored
        .into_iter()
        .filter(|(distance, _)| *distance <= max_distance)
        .take(3)
        .map(|(_, candidate)| candidate)
        .collect()
}

/// Decide how the first two `prompt new` arguments are used.
///
/// Returns `(template_path, prompt_text)`:
/// - no template: `(None, prompt_text)`
/// - template found: `(Some(path), prompt_text)`
/// - template not found and no prompt text: the argument *is* the prompt
///   text, so `(None, Some(template))`
///
/// # Errors
///
/// [`ArxError::TemplateLookupFailed`] when the template is not found and
/// prompt text was also given, since the intent is then ambiguous.
pub fn resolve_template_arg(
    template: Option<&str>,
    prompt_text: Option<&str>,
    config: &ArxConfig,
) -> Result<(Option<PathBuf>, Option<String>)> {
    let prompt_text = prompt_text.map(str::to_string);
    let Some(template) = template.filter(|t| !t.is_empty()) else {
        return Ok((None, prompt_text));
    };

    if let Some(path) = find_template(template, config) {
        return Ok((Some(path), prompt_text));
    }

    if prompt_text.is_none() {
        tracing::debug!("'{}' is not a template, using it as prompt text", template);
        return Ok((None, Some(template.to_string())));
    }

    Err(ArxError::TemplateLookupFailed {
        name: template.to_string(),
        searched: config.template_dirs.clone(),
        suggestions: template_suggestions(template_name(template), &config.template_dirs),
    })
}

fn template_name(template: &str) -> &str {
    Path::new(template).file_stem().and_then(|stem| stem.to_str()).unwrap_or(template)
}
