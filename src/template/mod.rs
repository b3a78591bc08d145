//! Template lifecycle: fetch once, build once, render many
//!
//! A [`Template`] owns an immutable locator, the body bytes fetched eagerly
//! at construction, a mutable function table, an instance binding table for
//! the `alias`/`var` builtins, and a lazily built parse. The lifecycle is
//! an explicit two-state machine:
//!
//! ```text
//! Unbuilt --first render or explicit build--> Built
//! ```
//!
//! The transition (and function-table mutation) is the engine's only
//! critical section. Once built, the parse is read-only and concurrent
//! [`Template::render`] calls with distinct contexts need no coordination.
//! The binding table is the documented exception: it is scoped to the
//! instance, so concurrent renders of the *same* instance that both use
//! `alias` can race on it. Callers that need isolation render through
//! separate instances.
//!
//! # Builtins
//!
//! Every template exposes `ref`, `to_json`, `from_json`, `lines`, `alias`,
//! `var` and `include` (see [`builtins`](self)); caller-registered
//! [`TemplateFn`]s extend (or shadow) that set when added before the first
//! build.
//!
//! # Examples
//!
//! ```rust
//! use refract::{FetchOptions, Template};
//!
//! # fn main() -> refract::Result<()> {
//! let template = Template::load(
//!     "str://size={{ ref(path='/Parameters/Size/ParameterValue', value=this) }}",
//!     FetchOptions { socket_dir: None },
//! )?;
//! let output = template.render(&serde_json::json!({
//!     "Parameters": { "Size": { "ParameterValue": "3" } }
//! }))?;
//! assert_eq!(output, "size=3");
//! # Ok(())
//! # }
//! ```

mod builtins;
mod functions;

pub use functions::{FnError, FnResult, TemplateFn};

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tera::Tera;

use crate::error::{RefractError, Result};
use crate::locator::{FetchOptions, Locator};

/// Instance binding table backing the `alias`/`var` builtins
type Bindings = BTreeMap<String, serde_json::Value>;

/// Function table plus lifecycle state, guarded by one mutex
struct Inner {
    funcs: BTreeMap<String, TemplateFn>,
    state: BuildState,
}

/// The two-state build lifecycle
enum BuildState {
    Unbuilt,
    Built(Arc<Tera>),
}

/// A template bound to a locator, with a build-once parse
///
/// Construction ([`Template::load`]) eagerly fetches the body and fails if
/// the fetch fails - no partially constructed template exists. The body is
/// parsed once, on the first render or an explicit [`Template::build`], and
/// the parse is reused by every subsequent render.
pub struct Template {
    locator: Locator,
    body: Vec<u8>,
    options: FetchOptions,
    bindings: Arc<Mutex<Bindings>>,
    inner: Arc<Mutex<Inner>>,
}

impl Template {
    /// Fetch a template's body and construct it in the Unbuilt state
    ///
    /// # Errors
    ///
    /// Any fetch failure (missing file, non-2xx response, missing socket,
    /// unsupported scheme) aborts construction.
    pub fn load(locator: impl Into<Locator>, options: FetchOptions) -> Result<Self> {
        let locator = locator.into();
        let body = locator.fetch(&options)?;
        tracing::debug!(locator = %locator, bytes = body.len(), "template body fetched");
        Ok(Self {
            locator,
            body,
            options,
            bindings: Arc::new(Mutex::new(BTreeMap::new())),
            inner: Arc::new(Mutex::new(Inner {
                funcs: BTreeMap::new(),
                state: BuildState::Unbuilt,
            })),
        })
    }

    /// The locator this template was fetched from
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// The raw body bytes fetched at construction
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Register a function under `name`, replacing any previous binding
    ///
    /// Takes effect on the next build. Registration after the template is
    /// Built is accepted but does not touch the cached parse - re-register
    /// on a freshly constructed template instead.
    pub fn add_fn(&self, name: impl Into<String>, function: TemplateFn) -> &Self {
        let mut inner = lock(&self.inner);
        if matches!(inner.state, BuildState::Built(_)) {
            tracing::debug!(
                locator = %self.locator,
                "function registered after build; cached parse unaffected"
            );
        }
        inner.funcs.insert(name.into(), function);
        self
    }

    /// Transition Unbuilt → Built without rendering
    ///
    /// Rendering builds on demand; an explicit build is useful to surface
    /// parse errors early.
    ///
    /// # Errors
    ///
    /// Fails if the body is not UTF-8 or does not parse.
    pub fn build(&self) -> Result<()> {
        self.built_engine().map(|_| ())
    }

    /// Render the template against a context
    ///
    /// Builds first if necessary. If the context's serialized image is an
    /// object, its fields become top-level template variables; the whole
    /// context is always additionally bound as `this`. Repeated renders
    /// with an identical context produce byte-identical output.
    ///
    /// # Errors
    ///
    /// Build errors on first render, plus evaluation failures: a builtin or
    /// registered function returned an error, or the substitution syntax
    /// treated a missing value as fatal. Partial output is discarded.
    pub fn render<C: Serialize + ?Sized>(&self, context: &C) -> Result<String> {
        let engine = self.built_engine()?;
        let image =
            serde_json::to_value(context).map_err(|source| RefractError::ContextSerialize {
                locator: self.locator.to_string(),
                source,
            })?;

        let mut render_context = tera::Context::new();
        if let serde_json::Value::Object(entries) = &image {
            for (key, value) in entries {
                render_context.insert(key, value);
            }
        }
        render_context.insert("this", &image);

        tracing::debug!(locator = %self.locator, "rendering template");
        engine.render(self.locator.as_str(), &render_context).map_err(|source| {
            RefractError::TemplateRender { locator: self.locator.to_string(), source }
        })
    }

    /// Build if Unbuilt and hand back the shared parse
    fn built_engine(&self) -> Result<Arc<Tera>> {
        let mut inner = lock(&self.inner);
        if let BuildState::Built(engine) = &inner.state {
            return Ok(Arc::clone(engine));
        }

        let body =
            std::str::from_utf8(&self.body).map_err(|source| RefractError::BodyNotUtf8 {
                locator: self.locator.to_string(),
                source,
            })?;

        let mut engine = Tera::default();
        // Text engine: no HTML autoescaping, whatever the locator's suffix.
        engine.autoescape_on(Vec::new());
        builtins::register(&mut engine, &self.locator, &self.options, &self.inner, &self.bindings);
        // Caller-registered functions overlay the builtins.
        for (name, function) in &inner.funcs {
            functions::register(&mut engine, name, function);
        }
        engine.add_raw_template(self.locator.as_str(), body).map_err(|source| {
            RefractError::TemplateParse { locator: self.locator.to_string(), source }
        })?;

        let engine = Arc::new(engine);
        inner.state = BuildState::Built(Arc::clone(&engine));
        tracing::debug!(locator = %self.locator, "template built");
        Ok(engine)
    }
}

/// Lock a template mutex, surviving poisoning from a panicked render thread
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Render an error and its source chain on one line
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
