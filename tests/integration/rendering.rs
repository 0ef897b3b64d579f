//! Integration tests for ARX rendering.

use agentrx::templating::{
    Context, EnvSnapshot, Phase, TemplateRenderer, build_context, render, render_file,
    render_with_phase,
};
use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;

fn ctx(value: serde_json::Value) -> Context {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn test_text_without_tags_is_untouched() {
    agentrx::test_utils::init_test_logging(None);

    let texts = [
        "",
        "# Heading\n\nPlain paragraph.",
        "Looks close: <ARX [[x]]> and [[x]] and <ARX x />",
        "```rust\nlet s = \"<ARX\";\n```",
    ];
    let context = ctx(json!({"x": "should not appear"}));
    for text in texts {
        assert_eq!(render(text, &context, &EnvSnapshot::empty()), text);
    }
}

#[test]
fn test_rerender_is_fixed_point() {
    let context = ctx(json!({"name": "Ann", "n": 3, "list": ["a"]}));
    let env = EnvSnapshot::empty();
    let template = "<ARX [[name]] /> has <ARX [[n]] /> <ARX [[list]] /> <ARX [[nope]] />";

    let first = render(template, &context, &env);
    let second = render(&first, &context, &env);
    assert_eq!(first, r#"Ann has 3 ["a"] <ARX [[nope]] />"#);
    assert_eq!(first, second);
}

#[test]
fn test_phase_isolation() {
    let env = EnvSnapshot::empty();
    let body = "<ARX [[a]] :new />bob<ARX [[b]] :do />";

    let after_new = render_with_phase(body, &ctx(json!({"a": "X"})), Phase::New, &env);
    assert_eq!(after_new, "Xbob<ARX [[b]] :do />");

    let after_do = render_with_phase(&after_new, &ctx(json!({"b": "Y"})), Phase::Do, &env);
    assert_eq!(after_do, "XbobY");
}

#[test]
fn test_default_fallback_and_preservation() {
    let env = EnvSnapshot::empty();
    let empty = Context::new();
    assert_eq!(render(r#"<ARX [[missing | "fallback"]] />"#, &empty, &env), "fallback");
    assert_eq!(render("<ARX [[missing]] />", &empty, &env), "<ARX [[missing]] />");
}

#[test]
fn test_environment_expansion() {
    let env = EnvSnapshot::empty().with_var("FOO", "bar");
    let empty = Context::new();
    assert_eq!(render("$FOO and ${FOO}", &empty, &env), "bar and bar");
    assert_eq!(render("$UNSET", &empty, &env), "$UNSET");
}

#[test]
fn test_dotted_path() {
    let env = EnvSnapshot::empty();
    let context = ctx(json!({"user": {"tags": ["x", "y"]}}));
    assert_eq!(render("<ARX [[user.tags.1]] />", &context, &env), "y");
    assert_eq!(render("<ARX [[user.tags.9]] />", &context, &env), "<ARX [[user.tags.9]] />");
}

#[test]
fn test_render_file_returns_front_matter_untouched() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("prompt.md");
    std::fs::write(&path, "---\nk: v\n---\n<ARX [[k]] />")?;
    let env = EnvSnapshot::empty();

    // Front matter is not part of the context.
    let (fm, body) = render_file(&path, &Context::new(), Phase::Any, &env)?;
    assert_eq!(fm, Some(ctx(json!({"k": "v"}))));
    assert_eq!(body, "<ARX [[k]] />");

    // Callers who want it can pass it in explicitly.
    let fm = fm.unwrap_or_default();
    let (_, body) = render_file(&path, &fm, Phase::Any, &env)?;
    assert_eq!(body, "v");
    Ok(())
}

#[test]
fn test_malformed_front_matter_is_soft() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("prompt.md");
    let original = "---\nkey: [unclosed\n---\nHello <ARX [[who]] />";
    std::fs::write(&path, original)?;

    let renderer = TemplateRenderer::new(EnvSnapshot::empty());
    let rendered = renderer.render_file(&path, &ctx(json!({"who": "you"})), Phase::Any)?;
    assert_eq!(rendered.front_matter, Some(Context::new()));
    assert_eq!(rendered.body, "---\nkey: [unclosed\n---\nHello you");
    Ok(())
}

#[test]
fn test_full_template_with_data_file() -> Result<()> {
    let temp = TempDir::new()?;
    let data = temp.path().join("ctx.yaml");
    std::fs::write(
        &data,
        "ticket: ENG-42\nowner:\n  name: Ann\n  teams: [core, infra]\npriority: 2\nurgent: true\n",
    )?;
    let template = temp.path().join("t.md");
    std::fs::write(
        &template,
        "---\nsubdir: tickets\n---\n\
         # <ARX [[ticket]] /> for <ARX [[owner.name]] />\n\
         Team: <ARX [[owner.teams.-1]] />\n\
         Priority <ARX [[priority]] />, urgent: <ARX [[urgent]] />\n\
         Reviewer: <ARX [[reviewer | 'unassigned']] />\n\
         Host: <ARX [[env.HOSTNAME | \"local\"]] />\n\
         <ARX [[#each owner.teams]]>\n- <ARX [[this]] />\n<ARX [[/each]] />\n",
    )?;

    let context = build_context(None, Some(&data), None)?;
    let (fm, body) = render_file(&template, &context, Phase::Do, &EnvSnapshot::empty())?;

    assert_eq!(fm.as_ref().and_then(|fm| fm.get("subdir")), Some(&json!("tickets")));
    assert_eq!(
        body,
        "# ENG-42 for Ann\n\
         Team: infra\n\
         Priority 2, urgent: true\n\
         Reviewer: unassigned\n\
         Host: local\n\
         <ARX [[#each owner.teams]]>\n- <ARX [[this]] />\n<ARX [[/each]] />\n"
    );
    Ok(())
}

#[test]
fn test_renderer_is_shareable_across_threads() {
    let renderer = std::sync::Arc::new(TemplateRenderer::new(
        EnvSnapshot::empty().with_var("SUFFIX", "!"),
    ));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let renderer = renderer.clone();
            std::thread::spawn(move || {
                renderer.render("<ARX [[i]] />$SUFFIX", &ctx(json!({ "i": i })))
            })
        })
        .collect();

    let mut outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    outputs.sort();
    assert_eq!(outputs, ["0!", "1!", "2!", "3!"]);
}
