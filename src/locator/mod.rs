//! Template locators: scheme-qualified references and relative joining
//!
//! A [`Locator`] identifies where a template's bytes come from. Supported
//! forms:
//!
//! - `file:///path/to/template.tpl` or a bare filesystem path
//! - `http://` / `https://` URLs
//! - `unix://socket-name/path` - an HTTP GET over a unix domain socket
//!   discovered under a configured directory (see
//!   [`FetchOptions::socket_dir`])
//! - `str://<body>` - an inline literal template; the remainder of the
//!   string *is* the body and no fetch happens
//!
//! Relative references (used by the `include` builtin) resolve against the
//! directory portion of the base locator's path component with `.`/`..`
//! normalization. This is a directory join, not a full relative-URI merge:
//! query strings and fragments are not modeled.

mod fetch;

pub use fetch::{ENV_SOCKET_DIR, FetchOptions};

use url::Url;

use crate::error::{RefractError, Result};

/// Prefix marking an inline literal template
pub const LITERAL_PREFIX: &str = "str://";

/// A scheme-qualified reference to a template's source bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator(String);

impl Locator {
    /// Wrap a locator string
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// The locator's string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is an inline `str://` literal
    pub fn is_literal(&self) -> bool {
        self.0.starts_with(LITERAL_PREFIX)
    }

    /// Join a reference onto this locator
    ///
    /// A reference that carries its own scheme is absolute and is used
    /// unchanged (after URL validation, except for `str://` literals whose
    /// remainder is opaque). Anything else resolves against the directory
    /// portion of this locator's path component:
    ///
    /// ```rust
    /// use refract::Locator;
    ///
    /// let base = Locator::new("http://host/foo/bar/baz.tpl");
    /// assert_eq!(base.join("./boo.tpl").unwrap().as_str(), "http://host/foo/bar/boo.tpl");
    /// assert_eq!(base.join("../up.tpl").unwrap().as_str(), "http://host/foo/up.tpl");
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if an absolute reference or this locator is not a parseable
    /// URL, or if a relative reference is joined against an inline
    /// `str://` literal (which has no path to resolve against).
    pub fn join(&self, reference: &str) -> Result<Locator> {
        if has_scheme(reference) {
            if reference.starts_with(LITERAL_PREFIX) {
                return Ok(Locator::new(reference));
            }
            let url = Url::parse(reference).map_err(|source| RefractError::InvalidLocator {
                locator: reference.to_string(),
                source,
            })?;
            return Ok(Locator::new(url));
        }

        if self.is_literal() {
            return Err(RefractError::RelativeToLiteral { reference: reference.to_string() });
        }

        if has_scheme(&self.0) {
            let mut url = Url::parse(&self.0).map_err(|source| RefractError::InvalidLocator {
                locator: self.0.clone(),
                source,
            })?;
            let joined = join_dir(url.path(), reference);
            url.set_path(&joined);
            Ok(Locator::new(url))
        } else {
            // Bare filesystem path base.
            Ok(Locator::new(join_dir(&self.0, reference)))
        }
    }
}

impl From<Url> for Locator {
    fn from(url: Url) -> Self {
        Self(url.into())
    }
}

impl From<&str> for Locator {
    fn from(locator: &str) -> Self {
        Self::new(locator)
    }
}

impl From<String> for Locator {
    fn from(locator: String) -> Self {
        Self(locator)
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Whether a reference carries a scheme prefix (a `://` past position 0)
fn has_scheme(reference: &str) -> bool {
    matches!(reference.find("://"), Some(position) if position > 0)
}

/// Replace the final path segment with `reference` and normalize
fn join_dir(base_path: &str, reference: &str) -> String {
    let directory = match base_path.rfind('/') {
        Some(0) => "/",
        Some(position) => &base_path[..position],
        None => "",
    };
    let combined = if directory.is_empty() {
        reference.to_string()
    } else if directory == "/" {
        format!("/{reference}")
    } else {
        format!("{directory}/{reference}")
    };
    normalize(&combined)
}

/// Collapse `.`, `..` and empty segments; `..` never climbs above root
fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), None | Some(&"..")) {
                    if !absolute {
                        segments.push("..");
                    }
                } else {
                    segments.pop();
                }
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if absolute { format!("/{joined}") } else { joined }
}
