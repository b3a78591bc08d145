//! Builtin template functions
//!
//! These are registered on every template at build time, independent of
//! caller-registered functions (which may shadow them by name, since the
//! function table is overlaid after the builtins). Each builtin is a
//! closure factory in the style of the engine's custom-filter support:
//! captures are taken at build time, arguments are named.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value as Json;
use tera::Tera;

use super::functions::required_str;
use super::{Bindings, Inner, Template, error_chain, lock};
use crate::locator::{FetchOptions, Locator};
use crate::path;
use crate::value::Value;

/// Register the builtin function set on a freshly built engine
pub(super) fn register(
    engine: &mut Tera,
    locator: &Locator,
    options: &FetchOptions,
    inner: &Arc<Mutex<Inner>>,
    bindings: &Arc<Mutex<Bindings>>,
) {
    engine.register_function("ref", ref_builtin());
    engine.register_function("to_json", to_json_builtin());
    engine.register_function("from_json", from_json_builtin());
    engine.register_function("lines", lines_builtin());
    engine.register_function("alias", alias_builtin(Arc::clone(bindings)));
    engine.register_function("var", var_builtin(Arc::clone(bindings)));
    engine.register_function(
        "include",
        include_builtin(locator.clone(), options.clone(), Arc::clone(inner)),
    );
}

/// `ref(path=, value=)` - resolve a path expression against a value
///
/// Misses of every kind (unknown key, out-of-range index, shape mismatch)
/// yield `null`, never an error.
fn ref_builtin() -> impl tera::Function {
    |args: &HashMap<String, Json>| -> tera::Result<Json> {
        let expression = required_str("ref", args, "path")?;
        let value = args.get("value").cloned().unwrap_or(Json::Null);
        let dynamic = Value::from(value);
        match path::resolve(&dynamic, &path::tokenize(expression)) {
            Some(found) => {
                serde_json::to_value(found).map_err(|error| tera::Error::msg(error.to_string()))
            }
            None => Ok(Json::Null),
        }
    }
}

/// `to_json(value=)` - indented JSON text of any value
fn to_json_builtin() -> impl tera::Function {
    |args: &HashMap<String, Json>| -> tera::Result<Json> {
        let value = args.get("value").cloned().unwrap_or(Json::Null);
        let text = serde_json::to_string_pretty(&value)
            .map_err(|error| tera::Error::msg(format!("`to_json`: {error}")))?;
        Ok(Json::String(text))
    }
}

/// `from_json(value=)` - parse text content into a mapping
fn from_json_builtin() -> impl tera::Function {
    |args: &HashMap<String, Json>| -> tera::Result<Json> {
        let Some(Json::String(text)) = args.get("value") else {
            return Err(tera::Error::msg("not supported: `from_json` expects text content"));
        };
        let entries: serde_json::Map<String, Json> = serde_json::from_str(text)
            .map_err(|error| tera::Error::msg(format!("`from_json`: {error}")))?;
        Ok(Json::Object(entries))
    }
}

/// `lines(value=)` - split text content on newlines
fn lines_builtin() -> impl tera::Function {
    |args: &HashMap<String, Json>| -> tera::Result<Json> {
        let Some(Json::String(text)) = args.get("value") else {
            return Err(tera::Error::msg("not supported: `lines` expects text content"));
        };
        Ok(Json::Array(text.split('\n').map(|line| Json::String(line.to_string())).collect()))
    }
}

/// `alias(name=, value=)` - bind a value in the instance binding table
///
/// Renders as the empty string; the stored value is retrieved with `var`.
/// The table is scoped to the template instance, not to one render pass.
fn alias_builtin(bindings: Arc<Mutex<Bindings>>) -> impl tera::Function {
    move |args: &HashMap<String, Json>| -> tera::Result<Json> {
        let name = required_str("alias", args, "name")?;
        let value = args.get("value").cloned().unwrap_or(Json::Null);
        lock(&bindings).insert(name.to_string(), value);
        Ok(Json::String(String::new()))
    }
}

/// `var(name=, doc=?)` - look up a value bound with `alias`
///
/// The optional `doc` argument is accepted for template self-documentation
/// and otherwise ignored. An unbound name fails the render.
fn var_builtin(bindings: Arc<Mutex<Bindings>>) -> impl tera::Function {
    move |args: &HashMap<String, Json>| -> tera::Result<Json> {
        let name = required_str("var", args, "name")?;
        lock(&bindings)
            .get(name)
            .cloned()
            .ok_or_else(|| tera::Error::msg(format!("undefined var `{name}`")))
    }
}

/// `include(locator=, context=?)` - render another template inline
///
/// The reference resolves against the including template's own locator
/// (absolute references are used as-is). The included template is a fresh
/// instance that receives a snapshot of the current function table and its
/// own empty binding table. No cycle detection is performed; a template
/// graph with mutual or self includes recurses until the stack runs out.
fn include_builtin(
    base: Locator,
    options: FetchOptions,
    inner: Arc<Mutex<Inner>>,
) -> impl tera::Function {
    move |args: &HashMap<String, Json>| -> tera::Result<Json> {
        let reference = required_str("include", args, "locator")?;
        let resolved = base
            .join(reference)
            .map_err(|error| tera::Error::msg(format!("`include`: {}", error_chain(&error))))?;
        tracing::debug!(base = %base, reference, resolved = %resolved, "including template");

        let included = Template::load(resolved, options.clone())
            .map_err(|error| tera::Error::msg(format!("`include`: {}", error_chain(&error))))?;
        let snapshot = lock(&inner).funcs.clone();
        for (name, function) in snapshot {
            included.add_fn(name, function);
        }

        let context = args.get("context").cloned().unwrap_or(Json::Null);
        let rendered = included
            .render(&context)
            .map_err(|error| tera::Error::msg(format!("`include`: {}", error_chain(&error))))?;
        Ok(Json::String(rendered))
    }
}
