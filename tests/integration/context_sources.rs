//! Integration tests for merging context data sources.

use agentrx::core::ArxError;
use agentrx::templating::{DataSource, build_context};
use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_precedence_file_inline_stdin() -> Result<()> {
    agentrx::test_utils::init_test_logging(None);

    let temp = TempDir::new()?;
    let file = temp.path().join("data.json");
    std::fs::write(&file, r#"{"k": "file"}"#)?;

    let ctx = build_context(Some(r#"{"k":"inline"}"#), Some(&file), Some(r#"{"k":"stdin"}"#))?;
    assert_eq!(json!(ctx), json!({"k": "stdin"}));
    Ok(())
}

#[test]
fn test_malformed_inline_is_attributed() {
    let err = build_context(Some(r#"{"k": "#), None, None).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("inline"), "unexpected message: {message}");
    assert!(message.contains("--data"), "unexpected message: {message}");
    assert!(matches!(
        err,
        ArxError::DataSourceInvalid {
            data_source: DataSource::Inline,
            ..
        }
    ));
}

#[test]
fn test_bad_source_aborts_whole_merge() -> Result<()> {
    let temp = TempDir::new()?;
    let file = temp.path().join("data.yml");
    std::fs::write(&file, "good: yes\n")?;

    let result = build_context(Some(r#"{"fine": 1}"#), Some(&file), Some("not json"));
    assert!(matches!(
        result,
        Err(ArxError::DataSourceInvalid {
            data_source: DataSource::Stdin,
            ..
        })
    ));
    Ok(())
}

#[test]
fn test_missing_data_file_names_path() -> Result<()> {
    let temp = TempDir::new()?;
    let missing = temp.path().join("absent.yaml");
    let err = build_context(None, Some(&missing), None).unwrap_err();
    assert!(err.to_string().contains("absent.yaml"));
    Ok(())
}

#[test]
fn test_yaml_and_json_files_by_extension() -> Result<()> {
    let temp = TempDir::new()?;
    let yaml = temp.path().join("data.yaml");
    std::fs::write(&yaml, "nested:\n  list: [1, 2.5, null]\n")?;
    let json_file = temp.path().join("data.json");
    std::fs::write(&json_file, r#"{"nested": {"list": []}}"#)?;

    let from_yaml = build_context(None, Some(&yaml), None)?;
    assert_eq!(from_yaml["nested"], json!({"list": [1, 2.5, null]}));

    let from_json = build_context(None, Some(&json_file), None)?;
    assert_eq!(from_json["nested"], json!({"list": []}));
    Ok(())
}

#[test]
fn test_whitespace_stdin_is_ignored() -> Result<()> {
    let ctx = build_context(Some(r#"{"a": 1}"#), None, Some("\n  \t\n"))?;
    assert_eq!(json!(ctx), json!({"a": 1}));
    Ok(())
}
