//! Integration tests for user-facing error reporting.

use agentrx::core::{ArxError, user_friendly_error};
use agentrx::templating::{Context, EnvSnapshot, Phase, build_context, render_file};
use anyhow::Context as _;
use tempfile::TempDir;

#[test]
fn test_missing_template_reports_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nowhere.md");

    let err = render_file(&path, &Context::new(), Phase::New, &EnvSnapshot::empty()).unwrap_err();
    let report = user_friendly_error(anyhow::Error::from(err)).to_string();

    assert!(report.contains("Template file not found"));
    assert!(report.contains("nowhere.md"));
    assert!(report.contains("Suggestion:"));
}

#[test]
fn test_data_error_survives_anyhow_context() {
    let err = build_context(Some("[1"), None, None)
        .context("while preparing the prompt")
        .unwrap_err();

    let report = user_friendly_error(err);
    assert!(matches!(report.error, ArxError::DataSourceInvalid { .. }));
    assert!(report.details.unwrap_or_default().contains("inline JSON (--data)"));
}

#[test]
fn test_foreign_errors_keep_their_message() {
    let report = user_friendly_error(anyhow::anyhow!("something else broke"));
    assert!(report.to_string().contains("something else broke"));
}
