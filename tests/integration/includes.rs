//! Integration tests for recursive template composition via `include`.
//!
//! These tests verify that:
//! - Relative references resolve against the including template's locator
//! - The current function table is copied into included templates
//! - An explicit context flows into the included render
//! - Missing include targets fail the including render

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::Path;

use refract::{FetchOptions, RefractError, StackModel, Template, TemplateFn, Value};

use crate::common::init_logging;

fn options() -> FetchOptions {
    FetchOptions { socket_dir: None }
}

fn write(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body)?;
    Ok(())
}

/// A sibling reference resolves against the including template's
/// directory, and the supplied context becomes the included template's
/// whole context.
#[test]
fn includes_resolve_relative_to_the_including_template() -> Result<()> {
    init_logging();

    let dir = tempfile::tempdir()?;
    write(
        &dir.path().join("main.tpl"),
        r#"zone: {{ include(locator="./partial.tpl", context=ref(path="/Resources", value=this)) }}"#,
    )?;
    write(
        &dir.path().join("partial.tpl"),
        r#"{{ ref(path="/'AWS::EC2::Subnet'/a/AvailabilityZone", value=this) }}"#,
    )?;

    let mut model = StackModel::new();
    model.add_resource(
        "AWS::EC2::Subnet",
        "a",
        Value::from(json!({ "AvailabilityZone": "us-east-1a" })),
    );

    let template =
        Template::load(dir.path().join("main.tpl").display().to_string(), options())?;
    assert_eq!(template.render(&model)?, "zone: us-east-1a");
    Ok(())
}

/// Parent-directory references work through `..` normalization.
#[test]
fn includes_traverse_parent_directories() -> Result<()> {
    init_logging();

    let dir = tempfile::tempdir()?;
    write(
        &dir.path().join("stacks/main.tpl"),
        r#"{{ include(locator="../shared/footer.tpl") }}"#,
    )?;
    write(&dir.path().join("shared/footer.tpl"), "-- generated --")?;

    let template = Template::load(
        dir.path().join("stacks/main.tpl").display().to_string(),
        options(),
    )?;
    assert_eq!(template.render(&json!({}))?, "-- generated --");
    Ok(())
}

/// The including template's function table is copied into the included
/// instance, so registered functions keep working below an include.
#[test]
fn included_templates_inherit_the_function_table() -> Result<()> {
    init_logging();

    let dir = tempfile::tempdir()?;
    write(
        &dir.path().join("main.tpl"),
        r#"{{ include(locator="./partial.tpl", context=this) }}"#,
    )?;
    write(&dir.path().join("partial.tpl"), "{{ shout(value=name) }}")?;

    let template =
        Template::load(dir.path().join("main.tpl").display().to_string(), options())?;
    template.add_fn(
        "shout",
        TemplateFn::emit(|value| Ok(value.as_str().unwrap_or_default().to_uppercase())),
    );

    assert_eq!(template.render(&json!({ "name": "quiet" }))?, "QUIET");
    Ok(())
}

/// Includes nest: each level resolves against its own locator.
#[test]
fn includes_nest_recursively() -> Result<()> {
    init_logging();

    let dir = tempfile::tempdir()?;
    write(
        &dir.path().join("a.tpl"),
        r#"a[{{ include(locator="./nested/b.tpl", context=this) }}]"#,
    )?;
    write(
        &dir.path().join("nested/b.tpl"),
        r#"b[{{ include(locator="./c.tpl", context=this) }}]"#,
    )?;
    write(&dir.path().join("nested/c.tpl"), "{{ leaf }}")?;

    let template = Template::load(dir.path().join("a.tpl").display().to_string(), options())?;
    assert_eq!(template.render(&json!({ "leaf": "c" }))?, "a[b[c]]");
    Ok(())
}

/// An absolute `str://` reference bypasses relative resolution entirely.
#[test]
fn absolute_literal_includes_are_used_as_is() -> Result<()> {
    init_logging();

    let template = Template::load(
        r#"str://[{{ include(locator="str://inline body") }}]"#,
        options(),
    )?;
    assert_eq!(template.render(&json!({}))?, "[inline body]");
    Ok(())
}

/// A missing include target aborts the including render with a fetch
/// failure, not partial output.
#[test]
fn missing_include_targets_fail_the_render() -> Result<()> {
    init_logging();

    let dir = tempfile::tempdir()?;
    write(
        &dir.path().join("main.tpl"),
        r#"{{ include(locator="./absent.tpl") }}"#,
    )?;

    let template =
        Template::load(dir.path().join("main.tpl").display().to_string(), options())?;
    let error = template.render(&json!({})).unwrap_err();
    assert!(matches!(error, RefractError::TemplateRender { .. }));
    Ok(())
}
