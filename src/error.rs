//! Error handling for refract
//!
//! This module provides the error types for the path-query and template
//! rendering engine. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **Chained sources** so transport and parser failures stay inspectable
//!
//! Path resolution is deliberately absent from this module: resolving a path
//! expression against a value is total and degrades to "no value"
//! ([`Option::None`]) instead of failing. Errors here come from the other
//! side of the engine - fetching template bytes, parsing a template body,
//! and evaluating a template at render time.
//!
//! # Error Categories
//!
//! - **Locator resolution**: [`RefractError::InvalidLocator`],
//!   [`RefractError::UnsupportedScheme`], [`RefractError::RelativeToLiteral`]
//! - **Fetch**: [`RefractError::FileRead`], [`RefractError::HttpFetch`],
//!   [`RefractError::SocketNotFound`], [`RefractError::NotASocket`],
//!   [`RefractError::SocketFetch`], [`RefractError::SocketResponse`]
//! - **Template lifecycle**: [`RefractError::BodyNotUtf8`],
//!   [`RefractError::TemplateParse`], [`RefractError::TemplateRender`],
//!   [`RefractError::ContextSerialize`]

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for refract operations
///
/// Each variant represents a specific failure mode and carries enough
/// context (locator, path, status) to report the failure without re-running
/// the operation.
#[derive(Error, Debug)]
pub enum RefractError {
    /// Locator string could not be parsed as a URL
    ///
    /// Returned when a scheme-qualified locator fails URL parsing, either
    /// during a relative join or at fetch time.
    #[error("invalid locator: {locator}")]
    InvalidLocator {
        /// The locator string that failed to parse
        locator: String,
        /// The underlying URL parse error
        #[source]
        source: url::ParseError,
    },

    /// Locator uses a scheme the fetcher does not support
    ///
    /// Supported schemes are `file://` (or a bare filesystem path),
    /// `http://`, `https://`, `unix://` and the inline literal prefix
    /// `str://`. Anything else lands here.
    #[error("unsupported locator scheme: {locator}")]
    UnsupportedScheme {
        /// The offending locator
        locator: String,
    },

    /// Relative reference joined against an inline literal template
    ///
    /// Inline `str://` locators have no path component to resolve against,
    /// so only absolute references may be included from them.
    #[error("cannot resolve relative reference {reference:?} against an inline template")]
    RelativeToLiteral {
        /// The relative reference that could not be resolved
        reference: String,
    },

    /// Reading a local template file failed
    #[error("failed to read template file: {path}")]
    FileRead {
        /// Path of the file that could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// HTTP(S) fetch failed
    ///
    /// Covers transport errors, non-2xx statuses and body read failures for
    /// `http://` and `https://` locators.
    #[error("http fetch failed: {url}")]
    HttpFetch {
        /// The URL that was being fetched
        url: String,
        /// The underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// No socket file exists for a `unix://` locator's host segment
    #[error("socket not found: {path}")]
    SocketNotFound {
        /// Path under the configured socket directory that was probed
        path: PathBuf,
        /// The underlying I/O error from the metadata probe
        #[source]
        source: std::io::Error,
    },

    /// The file named by a `unix://` locator's host segment is not a socket
    #[error("not a socket: {path}")]
    NotASocket {
        /// The non-socket path that was found
        path: PathBuf,
    },

    /// I/O over a unix domain socket failed
    #[error("socket fetch failed: {url}")]
    SocketFetch {
        /// The `unix://` locator being fetched
        url: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The HTTP response read over a unix domain socket was unusable
    ///
    /// Either the response could not be parsed at all or the server answered
    /// with a non-2xx status.
    #[error("bad response from socket: {url}: {reason}")]
    SocketResponse {
        /// The `unix://` locator being fetched
        url: String,
        /// Short description of what was wrong with the response
        reason: String,
    },

    /// Fetched template body is not valid UTF-8
    ///
    /// Bodies are kept as raw bytes until first build; the build step
    /// requires text.
    #[error("template body is not valid UTF-8: {locator}")]
    BodyNotUtf8 {
        /// Locator of the offending template
        locator: String,
        /// The underlying UTF-8 validation error
        #[source]
        source: std::str::Utf8Error,
    },

    /// Template body failed to parse
    ///
    /// Surfaces on the first render (or an explicit build) of a template
    /// whose body contains malformed substitution syntax.
    #[error("failed to parse template: {locator}")]
    TemplateParse {
        /// Locator of the offending template
        locator: String,
        /// The underlying engine error
        #[source]
        source: tera::Error,
    },

    /// Template evaluation failed
    ///
    /// A builtin or registered function returned an error, or the
    /// substitution syntax treated a missing value as fatal. Partial output
    /// is discarded.
    #[error("failed to render template: {locator}")]
    TemplateRender {
        /// Locator of the offending template
        locator: String,
        /// The underlying engine error
        #[source]
        source: tera::Error,
    },

    /// Render context could not be serialized into a value tree
    #[error("failed to serialize render context for template: {locator}")]
    ContextSerialize {
        /// Locator of the template being rendered
        locator: String,
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience result type for refract operations
pub type Result<T> = std::result::Result<T, RefractError>;
