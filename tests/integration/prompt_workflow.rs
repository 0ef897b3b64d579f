//! Integration tests for the `prompt new` -> `prompt do` lifecycle.

use agentrx::core::ArxError;
use agentrx::prompts::{DoPromptOutcome, DoPromptRequest, NewPromptRequest};
use agentrx::test_utils::PromptFixture;
use anyhow::{Result, bail};
use tempfile::TempDir;

const REVIEW_TEMPLATE: &str = "---
subdir: reviews
---
# Review: <ARX [[prompt]] :new />

Requested by <ARX [[env.ARX_USER | \"someone\"]] />.
Scope: <ARX [[scope | \"whole repo\"]] :new />

## Findings
<ARX [[findings | \"pending\"]] :do />
Severity: <ARX [[severity]] :do />
";

#[tokio::test]
async fn test_new_then_do() -> Result<()> {
    agentrx::test_utils::init_test_logging(None);

    let temp = TempDir::new()?;
    let fixture = PromptFixture::new(temp.path())?.with_env("ARX_USER", "ann");
    fixture.template("review", REVIEW_TEMPLATE)?;
    let workspace = fixture.workspace();

    let created = workspace
        .new_prompt(NewPromptRequest {
            template: Some("review".to_string()),
            prompt_text: Some("Audit token refresh".to_string()),
            ..Default::default()
        })
        .await?;

    assert!(created.written);
    assert!(created.path.starts_with(fixture.work_docs().join("reviews")));
    let file_name = created.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("audit_token_refresh_"), "got {file_name}");
    assert!(file_name.ends_with(".md"));

    let written = std::fs::read_to_string(&created.path)?;
    assert_eq!(
        written,
        "# Review: Audit token refresh\n\n\
         Requested by ann.\n\
         Scope: whole repo\n\n\
         ## Findings\n\
         <ARX [[findings | \"pending\"]] :do />\n\
         Severity: <ARX [[severity]] :do />\n"
    );
    assert_eq!(created.unresolved, vec!["findings | \"pending\"", "severity"]);

    let executed = workspace
        .do_prompt(DoPromptRequest {
            prompt: Some(created.path.to_string_lossy().into_owned()),
            stdin: Some(r#"{"severity": "high"}"#.to_string()),
            ..Default::default()
        })
        .await?;

    let DoPromptOutcome::Rendered {
        body,
        ..
    } = executed
    else {
        bail!("expected a rendered prompt");
    };
    assert!(body.ends_with("## Findings\npending\nSeverity: high\n"));

    // The prompt file itself still carries the `:do` tags.
    assert_eq!(std::fs::read_to_string(&created.path)?, written);
    Ok(())
}

#[tokio::test]
async fn test_do_picks_most_recent_prompt() -> Result<()> {
    let temp = TempDir::new()?;
    let fixture = PromptFixture::new(temp.path())?;
    let older = fixture.prompt("older.md", "old <ARX [[x]] />")?;
    let newer = fixture.prompt("newer.md", "new <ARX [[x]] />")?;

    let past = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
    std::fs::File::options().write(true).open(&older)?.set_modified(past)?;

    let outcome = fixture
        .workspace()
        .do_prompt(DoPromptRequest {
            data_json: Some(r#"{"x": 1}"#.to_string()),
            ..Default::default()
        })
        .await?;

    match outcome {
        DoPromptOutcome::Rendered {
            prompt_path,
            body,
            ..
        } => {
            assert_eq!(prompt_path, newer);
            assert_eq!(body, "new 1");
        }
        DoPromptOutcome::DryRun(_) => bail!("expected a rendered prompt"),
    }

    let listing = fixture.workspace().list_prompts(10)?;
    assert_eq!(listing.total, 2);
    assert_eq!(listing.entries[0].name, "newer.md");
    Ok(())
}

#[tokio::test]
async fn test_unknown_template_with_text_suggests_names() -> Result<()> {
    let temp = TempDir::new()?;
    let fixture = PromptFixture::new(temp.path())?;
    fixture.template("review", "x")?;

    let err = fixture
        .workspace()
        .new_prompt(NewPromptRequest {
            template: Some("reveiw".to_string()),
            prompt_text: Some("text".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    match err {
        ArxError::TemplateLookupFailed {
            suggestions,
            searched,
            ..
        } => {
            assert_eq!(suggestions, vec!["review".to_string()]);
            assert_eq!(searched, vec![fixture.templates_dir()]);
        }
        other => bail!("unexpected error: {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_do_dry_run_leaves_no_output() -> Result<()> {
    let temp = TempDir::new()?;
    let fixture = PromptFixture::new(temp.path())?;
    fixture.prompt("p.md", "<ARX [[k]] :do />")?;
    let data = fixture.file("data/ctx.json", r#"{"k": "v"}"#)?;
    let output = fixture.root().join("out.md");

    let outcome = fixture
        .workspace()
        .do_prompt(DoPromptRequest {
            prompt: Some("p.md".to_string()),
            data_file: Some(data),
            output: Some(output.clone()),
            dry_run: true,
            ..Default::default()
        })
        .await?;

    let text = outcome.stdout_text().unwrap_or_default();
    assert!(text.contains("Prompt file:"));
    assert!(text.contains("<ARX [[k]] :do />"));
    assert!(!output.exists());
    Ok(())
}
