//! Caller-registered template functions
//!
//! A template's function table holds heterogeneous callables - some
//! entries return a value, some return text-or-error, one is an
//! include-style renderer. The table is a closed sum: a registered
//! function picks one of three callable shapes at registration time, and
//! each shape is adapted onto the substitution engine with a fixed
//! named-argument convention.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as Json;
use tera::Tera;

/// Error type registered functions may return
pub type FnError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for the text-producing callable shapes
pub type FnResult<T> = std::result::Result<T, FnError>;

/// A function bound into a template's function table
///
/// Shapes and their call syntax inside a template body:
///
/// - [`TemplateFn::Select`] - `{{ name(path="/a/b", value=this) }}`;
///   value-producing, misses are the callee's business rather than errors.
/// - [`TemplateFn::Emit`] - `{{ name(value=...) }}`; produces text or fails
///   the render.
/// - [`TemplateFn::Compose`] - `{{ name(locator="...", context=...) }}`;
///   include-style, receives the optional context values in order.
///
/// Functions must be registered before a template's first build to take
/// effect; the parse caches its function bindings.
#[derive(Clone)]
pub enum TemplateFn {
    /// `(path, value) -> value`
    Select(Arc<dyn Fn(&str, &Json) -> Json + Send + Sync>),
    /// `(value) -> text or error`
    Emit(Arc<dyn Fn(&Json) -> FnResult<String> + Send + Sync>),
    /// `(locator, values...) -> text or error`
    Compose(Arc<dyn Fn(&str, &[Json]) -> FnResult<String> + Send + Sync>),
}

impl TemplateFn {
    /// Bind a `(path, value) -> value` function
    pub fn select(function: impl Fn(&str, &Json) -> Json + Send + Sync + 'static) -> Self {
        Self::Select(Arc::new(function))
    }

    /// Bind a `(value) -> text or error` function
    pub fn emit(function: impl Fn(&Json) -> FnResult<String> + Send + Sync + 'static) -> Self {
        Self::Emit(Arc::new(function))
    }

    /// Bind an include-style `(locator, values...) -> text or error` function
    pub fn compose(
        function: impl Fn(&str, &[Json]) -> FnResult<String> + Send + Sync + 'static,
    ) -> Self {
        Self::Compose(Arc::new(function))
    }
}

impl std::fmt::Debug for TemplateFn {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shape = match self {
            TemplateFn::Select(_) => "Select",
            TemplateFn::Emit(_) => "Emit",
            TemplateFn::Compose(_) => "Compose",
        };
        formatter.debug_tuple(shape).finish()
    }
}

/// Adapt a bound function onto the substitution engine under `name`
pub(super) fn register(engine: &mut Tera, name: &str, function: &TemplateFn) {
    match function {
        TemplateFn::Select(select) => {
            let select = Arc::clone(select);
            let fn_name = name.to_string();
            engine.register_function(
                name,
                move |args: &HashMap<String, Json>| -> tera::Result<Json> {
                    let path = required_str(&fn_name, args, "path")?;
                    let value = args.get("value").cloned().unwrap_or(Json::Null);
                    Ok(select(path, &value))
                },
            );
        }
        TemplateFn::Emit(emit) => {
            let emit = Arc::clone(emit);
            let fn_name = name.to_string();
            engine.register_function(
                name,
                move |args: &HashMap<String, Json>| -> tera::Result<Json> {
                    let value = args.get("value").cloned().unwrap_or(Json::Null);
                    let text = emit(&value)
                        .map_err(|error| tera::Error::msg(format!("`{fn_name}`: {error}")))?;
                    Ok(Json::String(text))
                },
            );
        }
        TemplateFn::Compose(compose) => {
            let compose = Arc::clone(compose);
            let fn_name = name.to_string();
            engine.register_function(
                name,
                move |args: &HashMap<String, Json>| -> tera::Result<Json> {
                    let locator = required_str(&fn_name, args, "locator")?;
                    let mut values = Vec::new();
                    if let Some(context) = args.get("context") {
                        values.push(context.clone());
                    }
                    let text = compose(locator, &values)
                        .map_err(|error| tera::Error::msg(format!("`{fn_name}`: {error}")))?;
                    Ok(Json::String(text))
                },
            );
        }
    }
}

/// Extract a required string argument, failing the render if absent
pub(super) fn required_str<'a>(
    function: &str,
    args: &'a HashMap<String, Json>,
    key: &str,
) -> tera::Result<&'a str> {
    args.get(key).and_then(Json::as_str).ok_or_else(|| {
        tera::Error::msg(format!("`{function}` requires a string `{key}` argument"))
    })
}
