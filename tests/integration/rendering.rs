//! Integration tests for template rendering.
//!
//! These tests verify that:
//! - Templates render against introspection-shaped contexts
//! - The body is fetched once and the parse is built once
//! - Builtins and registered functions compose inside one template
//! - Render failures discard partial output

use anyhow::Result;
use serde_json::json;

use refract::{
    FetchOptions, RefractError, Scalar, StackModel, Template, TemplateFn, Value, resolve, tokenize,
};

use crate::common::init_logging;

fn options() -> FetchOptions {
    FetchOptions { socket_dir: None }
}

/// Render a file template against a stack model, addressing a resource
/// whose type name contains `/`-unfriendly characters.
#[test]
fn renders_a_stack_model_from_a_file_template() -> Result<()> {
    init_logging();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("main.tpl");
    std::fs::write(
        &path,
        r#"manager subnet: {{ ref(path="/Resources/'AWS::EC2::Subnet'/managerSubnet/PhysicalResourceId", value=this) }}"#,
    )?;

    let mut model = StackModel::new();
    model.add_resource(
        "AWS::EC2::Subnet",
        "managerSubnet",
        Value::from(json!({ "PhysicalResourceId": "subnet-0a1b" })),
    );

    let template = Template::load(path.display().to_string(), options())?;
    assert_eq!(template.render(&model)?, "manager subnet: subnet-0a1b");
    Ok(())
}

/// The body is fetched exactly once, at construction: rewriting the
/// backing file between renders does not change the output.
#[test]
fn body_is_fetched_once_at_construction() -> Result<()> {
    init_logging();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("volatile.tpl");
    std::fs::write(&path, "v1 {{ who }}")?;

    let template = Template::load(path.display().to_string(), options())?;
    assert_eq!(template.render(&json!({ "who": "a" }))?, "v1 a");

    std::fs::write(&path, "v2 {{ who }}")?;
    assert_eq!(template.render(&json!({ "who": "a" }))?, "v1 a");

    // A fresh template sees the new body.
    let fresh = Template::load(path.display().to_string(), options())?;
    assert_eq!(fresh.render(&json!({ "who": "a" }))?, "v2 a");
    Ok(())
}

/// Repeated renders with an identical context are byte-identical.
#[test]
fn repeated_renders_are_byte_identical() -> Result<()> {
    init_logging();

    let mut model = StackModel::new();
    model.add_parameter("Size", Value::from(json!({ "ParameterValue": "3" })));
    model.add_parameter("Flavor", Value::from(json!({ "ParameterValue": "large" })));

    let template = Template::load("str://{{ to_json(value=this) }}", options())?;
    let first = template.render(&model)?;
    let second = template.render(&model)?;
    assert_eq!(first.as_bytes(), second.as_bytes());
    Ok(())
}

/// A registered describe-style function participates alongside builtins.
#[test]
fn registered_select_functions_render() -> Result<()> {
    init_logging();

    let template = Template::load(
        r#"str://{{ describe(path="/Resources/'AWS::EC2::VPC'/vpc/PhysicalResourceId", value=this) }}"#,
        options(),
    )?;
    template.add_fn(
        "describe",
        TemplateFn::select(|path, value| {
            let state = Value::from(value.clone());
            match resolve(&state, &tokenize(path)) {
                Some(Value::Scalar(Scalar::Text(id))) => {
                    serde_json::Value::String(format!("described-{id}"))
                }
                _ => serde_json::Value::Null,
            }
        }),
    );

    let mut model = StackModel::new();
    model.add_resource(
        "AWS::EC2::VPC",
        "vpc",
        Value::from(json!({ "PhysicalResourceId": "vpc-123" })),
    );
    assert_eq!(template.render(&model)?, "described-vpc-123");
    Ok(())
}

/// `from_json` turns text content back into an addressable mapping.
#[test]
fn from_json_feeds_ref() -> Result<()> {
    init_logging();

    let template = Template::load(
        r#"str://{{ ref(path="/config/region", value=from_json(value=raw)) }}"#,
        options(),
    )?;
    let context = json!({ "raw": r#"{ "config": { "region": "us-east-1" } }"# });
    assert_eq!(template.render(&context)?, "us-east-1");
    Ok(())
}

/// A failing registered function aborts the render; partial output is
/// discarded rather than returned.
#[test]
fn function_failures_abort_the_render() -> Result<()> {
    init_logging();

    let template = Template::load("str://before {{ fail(value=this) }}", options())?;
    template.add_fn("fail", TemplateFn::emit(|_| Err("backend unavailable".into())));

    let error = template.render(&json!({})).unwrap_err();
    assert!(matches!(error, RefractError::TemplateRender { .. }));
    Ok(())
}

/// The binding table is scoped to the instance: a value aliased during one
/// render is visible to a later render of the same template.
#[test]
fn bindings_persist_across_renders_of_one_instance() -> Result<()> {
    init_logging();

    let template = Template::load(
        "str://{% if store %}{{ alias(name='region', value=value) }}{% else %}{{ var(name='region') }}{% endif %}",
        options(),
    )?;
    assert_eq!(template.render(&json!({ "store": true, "value": "us-east-1" }))?, "");
    assert_eq!(template.render(&json!({ "store": false }))?, "us-east-1");
    Ok(())
}
