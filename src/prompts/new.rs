//! The `prompt new` stage: instantiate a template into a prompt file.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::PromptWorkspace;
use super::script::run_context_script;
use super::template::resolve_template_arg;
use crate::core::{ArxError, Result};
use crate::markdown::FrontMatter;
use crate::templating::context::merge_shallow;
use crate::templating::{Context, Phase, build_context, find_tags};

/// Output subdirectory used when neither the caller nor the template sets one.
pub const DEFAULT_SUBDIR: &str = "vibes";

/// Inputs for [`PromptWorkspace::new_prompt`].
#[derive(Debug, Clone, Default)]
pub struct NewPromptRequest {
    /// Template name or path. When it does not resolve and `prompt_text` is
    /// unset, it is used as the prompt text instead.
    pub template: Option<String>,
    /// The user's intent; available to templates as `prompt`.
    pub prompt_text: Option<String>,
    /// Inline JSON context (`--data`).
    pub data_json: Option<String>,
    /// JSON read from stdin.
    pub stdin: Option<String>,
    /// Base file name, overriding front matter and the derived name.
    pub short_name: Option<String>,
    /// Output subdirectory, overriding front matter.
    pub subdir: Option<String>,
    /// Plan only; write nothing.
    pub dry_run: bool,
}

/// What [`PromptWorkspace::new_prompt`] produced.
#[derive(Debug, Clone, Serialize)]
pub struct NewPromptOutcome {
    /// Template used, if any
    pub template: Option<PathBuf>,
    /// Output file path
    pub path: PathBuf,
    /// Output subdirectory under the work-docs root
    pub subdir: String,
    /// Base file name, before the timestamp suffix
    pub short_name: String,
    /// Rendered prompt body
    pub body: String,
    /// Template front matter, if the template had any
    pub front_matter: Option<FrontMatter>,
    /// Top-level context keys, sorted
    pub context_keys: Vec<String>,
    /// Expressions of tags still unresolved in the body (`:do` tags included)
    pub unresolved: Vec<String>,
    /// Whether the file was written (false for a dry run)
    pub written: bool,
}

impl NewPromptOutcome {
    /// Plain-text dry-run summary, body truncated to 600 characters.
    pub fn dry_run_summary(&self) -> String {
        let template = self
            .template
            .as_ref()
            .map_or_else(|| "(none)".to_string(), |path| path.display().to_string());

        let mut summary = String::from("=== Dry Run ===\n");
        summary.push_str(&format!("Template:  {template}\n"));
        summary.push_str(&format!("Output:    {}\n", self.path.display()));
        summary.push_str(&format!("Subdir:    {}\n", self.subdir));
        summary.push_str(&format!("Name:      {}\n", self.short_name));
        if !self.context_keys.is_empty() {
            summary.push_str(&format!("Context keys: {:?}\n", self.context_keys));
        }
        summary.push_str("\n=== Rendered body (first 600 chars) ===\n");
        summary.push_str(&preview(&self.body, 600));
        summary
    }
}

impl PromptWorkspace {
    /// Create a prompt file from a template and/or prompt text.
    ///
    /// The context is built from `data_json` and `stdin`; `prompt` is set to
    /// the prompt text unless the data already provides it. A template is
    /// rendered for [`Phase::New`]. If its front matter names a `script`, the
    /// script's output is merged over the context (script keys win) and the
    /// body is rendered again so tags left unresolved by the first pass can
    /// pick up the new values.
    ///
    /// # Errors
    ///
    /// - [`ArxError::MissingPromptInput`] with neither template nor text
    /// - [`ArxError::TemplateLookupFailed`] for an unknown template plus text
    /// - data source, template read and context script errors
    /// - [`ArxError::FileSystemError`] when the file cannot be written
    pub async fn new_prompt(&self, request: NewPromptRequest) -> Result<NewPromptOutcome> {
        let (template_path, prompt_text) = resolve_template_arg(
            request.template.as_deref(),
            request.prompt_text.as_deref(),
            self.config(),
        )?;
        let prompt_text = prompt_text.filter(|text| !text.is_empty());

        if template_path.is_none() && prompt_text.is_none() {
            return Err(ArxError::MissingPromptInput);
        }

        let mut context =
            build_context(request.data_json.as_deref(), None, request.stdin.as_deref())?;
        if let Some(text) = &prompt_text {
            context.entry("prompt").or_insert_with(|| Value::String(text.clone()));
        }

        let (front_matter, body) = match &template_path {
            Some(path) => self.render_template_stage(path, &mut context).await?,
            None => (None, prompt_text.clone().unwrap_or_default()),
        };

        let subdir = request
            .subdir
            .clone()
            .or_else(|| front_matter_str(front_matter.as_ref(), "subdir"))
            .unwrap_or_else(|| DEFAULT_SUBDIR.to_string());

        let short_name = request
            .short_name
            .clone()
            .or_else(|| front_matter_str(front_matter.as_ref(), "short_name"))
            .unwrap_or_else(|| match (&prompt_text, &template_path) {
                (Some(text), _) => derive_short_name(text),
                (None, Some(path)) => derive_short_name(&file_stem(path)),
                (None, None) => "prompt".to_string(),
            });

        let path = build_output_path(&self.config().work_docs, &subdir, &short_name, Local::now());

        let mut context_keys: Vec<String> = context.keys().cloned().collect();
        context_keys.sort();

        let mut outcome = NewPromptOutcome {
            template: template_path,
            path,
            subdir,
            short_name,
            unresolved: unresolved_tags(&body),
            body,
            front_matter,
            context_keys,
            written: false,
        };

        if request.dry_run {
            tracing::debug!("Dry run, not writing {}", outcome.path.display());
            return Ok(outcome);
        }

        if let Some(parent) = outcome.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ArxError::file_system("create directory", parent, &e))?;
        }
        tokio::fs::write(&outcome.path, &outcome.body)
            .await
            .map_err(|e| ArxError::file_system("write prompt", &outcome.path, &e))?;

        tracing::info!("Created prompt {}", outcome.path.display());
        outcome.written = true;
        Ok(outcome)
    }

    async fn render_template_stage(
        &self,
        template: &Path,
        context: &mut Context,
    ) -> Result<(Option<FrontMatter>, String)> {
        let rendered = self.renderer().render_file_async(template, context, Phase::New).await?;
        let mut body = rendered.body.clone();

        if let Some(script) = rendered.front_matter_str("script").filter(|s| !s.is_empty()) {
            let script_context =
                run_context_script(script, context, self.config().script_timeout).await?;
            merge_shallow(context, script_context);
            body = self.renderer().render_phase(&body, context, Phase::New);
        }

        Ok((rendered.front_matter, body))
    }
}

fn front_matter_str(front_matter: Option<&FrontMatter>, key: &str) -> Option<String> {
    front_matter?.get(key)?.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

fn file_stem(path: &Path) -> String {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Derive a file-name-safe short name from the first three words of `text`.
///
/// Each word is lowercased and stripped to alphanumerics; the pieces are
/// joined with `_`. Falls back to `prompt` when nothing is left.
///
/// ```rust
/// use agentrx::prompts::derive_short_name;
///
/// assert_eq!(derive_short_name("Implement user auth now"), "implement_user_auth");
/// assert_eq!(derive_short_name("Fix: the cache!"), "fix_the_cache");
/// assert_eq!(derive_short_name("?!"), "prompt");
/// ```
pub fn derive_short_name(text: &str) -> String {
    let name = text
        .split_whitespace()
        .take(3)
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if name.is_empty() { "prompt".to_string() } else { name }
}

/// `<work_docs>/<subdir>/<short_name>_<yy-mm-dd-HH>.md`
pub fn build_output_path(
    work_docs: &Path,
    subdir: &str,
    short_name: &str,
    now: DateTime<Local>,
) -> PathBuf {
    let stamp = now.format("%y-%m-%d-%H");
    work_docs.join(subdir).join(format!("{short_name}_{stamp}.md"))
}

/// Expressions of the variable tags still present in `body`, in order.
pub fn unresolved_tags(body: &str) -> Vec<String> {
    find_tags(body)
        .into_iter()
        .filter(|tag| !tag.is_structural())
        .map(|tag| tag.expression.to_string())
        .collect()
}

pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArxConfig;
    use crate::templating::EnvSnapshot;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn workspace(temp: &TempDir) -> PromptWorkspace {
        let templates = temp.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        let config = ArxConfig::default()
            .with_prompts_dir(temp.path().join("prompts"))
            .with_work_docs(temp.path().join("work"))
            .with_template_dirs(vec![templates]);
        PromptWorkspace::new(config, EnvSnapshot::empty().with_var("USER", "dev"))
    }

    fn template(temp: &TempDir, name: &str, content: &str) {
        std::fs::create_dir_all(temp.path().join("templates")).unwrap();
        std::fs::write(temp.path().join("templates").join(name), content).unwrap();
    }

    #[test]
    fn test_derive_short_name() {
        assert_eq!(derive_short_name("Refactor the payment module"), "refactor_the_payment");
        assert_eq!(derive_short_name("  one  "), "one");
        assert_eq!(derive_short_name(""), "prompt");
        assert_eq!(derive_short_name("ÜBER cool"), "über_cool");
    }

    #[test]
    fn test_build_output_path() {
        let now = Local.with_ymd_and_hms(2026, 3, 7, 9, 15, 0).unwrap();
        let path = build_output_path(Path::new("/w"), "vibes", "fix_bug", now);
        assert_eq!(path, PathBuf::from("/w/vibes/fix_bug_26-03-07-09.md"));
    }

    #[test]
    fn test_unresolved_tags() {
        let body = "<ARX [[a]] /> <ARX [[b | x]] :do /> <ARX [[#each c]] />";
        assert_eq!(unresolved_tags(body), vec!["a".to_string(), "b | x".to_string()]);
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("abc", 5), "abc");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("ééé", 2), "éé...");
    }

    #[tokio::test]
    async fn test_plain_prompt_text() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let outcome = ws
            .new_prompt(NewPromptRequest {
                prompt_text: Some("Implement user auth".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(outcome.written);
        assert_eq!(outcome.subdir, "vibes");
        assert_eq!(outcome.short_name, "implement_user_auth");
        assert!(outcome.path.starts_with(temp.path().join("work/vibes")));
        assert_eq!(std::fs::read_to_string(&outcome.path).unwrap(), "Implement user auth");
    }

    #[tokio::test]
    async fn test_unknown_template_is_prompt_text() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let outcome = ws
            .new_prompt(NewPromptRequest {
                template: Some("Debug the login flow".to_string()),
                dry_run: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(outcome.template, None);
        assert_eq!(outcome.body, "Debug the login flow");
        assert_eq!(outcome.short_name, "debug_the_login");
    }

    #[tokio::test]
    async fn test_template_new_phase_keeps_do_tags() {
        let temp = TempDir::new().unwrap();
        template(
            &temp,
            "review.md",
            "---\nsubdir: reviews\n---\n# <ARX [[prompt]] :new /> by $USER\nTicket: <ARX [[ticket]] />\nRun: <ARX [[run_id]] :do />",
        );
        let ws = workspace(&temp);

        let outcome = ws
            .new_prompt(NewPromptRequest {
                template: Some("review".to_string()),
                prompt_text: Some("Check auth module".to_string()),
                data_json: Some(r#"{"ticket": "ENG-42"}"#.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(
            outcome.body,
            "# Check auth module by dev\nTicket: ENG-42\nRun: <ARX [[run_id]] :do />"
        );
        assert_eq!(outcome.subdir, "reviews");
        assert_eq!(outcome.short_name, "check_auth_module");
        assert_eq!(outcome.unresolved, vec!["run_id".to_string()]);
        assert_eq!(outcome.context_keys, vec!["prompt".to_string(), "ticket".to_string()]);
        assert!(outcome.path.starts_with(temp.path().join("work/reviews")));
        assert_eq!(std::fs::read_to_string(&outcome.path).unwrap(), outcome.body);
    }

    #[tokio::test]
    async fn test_data_prompt_key_wins_over_prompt_text() {
        let temp = TempDir::new().unwrap();
        template(&temp, "t.md", "<ARX [[prompt]] />");
        let ws = workspace(&temp);
        let outcome = ws
            .new_prompt(NewPromptRequest {
                template: Some("t".to_string()),
                prompt_text: Some("from text".to_string()),
                stdin: Some(r#"{"prompt": "from stdin"}"#.to_string()),
                dry_run: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(outcome.body, "from stdin");
    }

    #[tokio::test]
    async fn test_name_precedence() {
        let temp = TempDir::new().unwrap();
        template(&temp, "named.md", "---\nshort_name: from_fm\nsubdir: fm_dir\n---\nbody");
        let ws = workspace(&temp);

        let from_fm = ws
            .new_prompt(NewPromptRequest {
                template: Some("named".to_string()),
                prompt_text: Some("words here".to_string()),
                dry_run: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(from_fm.short_name, "from_fm");
        assert_eq!(from_fm.subdir, "fm_dir");

        let explicit = ws
            .new_prompt(NewPromptRequest {
                template: Some("named".to_string()),
                short_name: Some("mine".to_string()),
                subdir: Some("elsewhere".to_string()),
                dry_run: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(explicit.short_name, "mine");
        assert_eq!(explicit.subdir, "elsewhere");
    }

    #[tokio::test]
    async fn test_template_stem_names_file_without_text() {
        let temp = TempDir::new().unwrap();
        template(&temp, "Daily-Plan.md", "plan");
        let ws = workspace(&temp);
        let outcome = ws
            .new_prompt(NewPromptRequest {
                template: Some("Daily-Plan".to_string()),
                dry_run: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(outcome.short_name, "dailyplan");
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let outcome = ws
            .new_prompt(NewPromptRequest {
                prompt_text: Some("just looking".to_string()),
                dry_run: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!outcome.written);
        assert!(!outcome.path.exists());
        assert!(!temp.path().join("work").exists());

        let summary = outcome.dry_run_summary();
        assert!(summary.contains("Template:  (none)"));
        assert!(summary.contains("Name:      just_looking"));
        assert!(summary.ends_with("just looking"));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let err = ws.new_prompt(NewPromptRequest::default()).await.unwrap_err();
        assert!(matches!(err, ArxError::MissingPromptInput));
    }

    #[tokio::test]
    async fn test_bad_data_aborts() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let err = ws
            .new_prompt(NewPromptRequest {
                prompt_text: Some("x".to_string()),
                data_json: Some("{oops".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ArxError::DataSourceInvalid { .. }));
        assert!(!temp.path().join("work").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_context_script_fills_second_pass() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let script = temp.path().join("ctx.sh");
        std::fs::write(
            &script,
            "#!/bin/sh\ncat > /dev/null\necho '{\"branch\": \"feature/x\", \"prompt\": \"overridden\"}'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        template(
            &temp,
            "git.md",
            &format!(
                "---\nscript: {}\n---\n<ARX [[prompt]] /> on <ARX [[branch]] :new /> <ARX [[sha]] :do />",
                script.display()
            ),
        );
        let ws = workspace(&temp);

        let outcome = ws
            .new_prompt(NewPromptRequest {
                template: Some("git".to_string()),
                prompt_text: Some("ship it".to_string()),
                dry_run: true,
                ..Default::default()
            })
            .await
            .unwrap();

        // `prompt` was substituted by the first pass; the script only fills what was left.
        assert_eq!(outcome.body, "ship it on feature/x <ARX [[sha]] :do />");
        assert_eq!(outcome.context_keys, vec!["branch".to_string(), "prompt".to_string()]);
        assert_eq!(outcome.front_matter.unwrap()["script"], json!(script.display().to_string()));
    }
}
