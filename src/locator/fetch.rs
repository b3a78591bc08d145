//! Fetching template bytes for each supported locator scheme
//!
//! All fetches are synchronous and may block the calling thread; deadlines
//! are a caller concern. A template fetches its body exactly once, at
//! construction, so none of these paths run during render.

use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use super::{LITERAL_PREFIX, Locator};
use crate::error::{RefractError, Result};

/// Environment variable naming the directory searched for `unix://` sockets
pub const ENV_SOCKET_DIR: &str = "SOCKET_DIR";

/// Configuration consulted when fetching template bytes
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Directory searched for the socket file named by a `unix://`
    /// locator's host segment. `None` makes every `unix://` fetch fail
    /// with a not-found error.
    pub socket_dir: Option<PathBuf>,
}

impl Default for FetchOptions {
    /// Read the socket directory from the `SOCKET_DIR` environment variable
    fn default() -> Self {
        Self { socket_dir: std::env::var_os(ENV_SOCKET_DIR).map(PathBuf::from) }
    }
}

impl Locator {
    /// Fetch the bytes this locator refers to
    ///
    /// - `str://` literals return the remainder of the locator string, no
    ///   I/O involved.
    /// - Bare paths and `file://` URLs read the whole file.
    /// - `http://` / `https://` issue a blocking GET and return the full
    ///   body; non-2xx statuses and transport errors propagate.
    /// - `unix://` connects to the socket file named by the host segment
    ///   under [`FetchOptions::socket_dir`] and issues an HTTP GET over the
    ///   stream (unix targets only).
    ///
    /// # Errors
    ///
    /// Any failure is an explicit error; see [`RefractError`] for the
    /// per-scheme variants. Unrecognized schemes fail with
    /// [`RefractError::UnsupportedScheme`].
    pub fn fetch(&self, options: &FetchOptions) -> Result<Vec<u8>> {
        if let Some(body) = self.as_str().strip_prefix(LITERAL_PREFIX) {
            return Ok(body.as_bytes().to_vec());
        }
        if !super::has_scheme(self.as_str()) {
            return read_file(Path::new(self.as_str()));
        }

        let url = Url::parse(self.as_str()).map_err(|source| RefractError::InvalidLocator {
            locator: self.as_str().to_string(),
            source,
        })?;
        tracing::debug!(locator = %self, scheme = url.scheme(), "fetching template body");
        match url.scheme() {
            "file" => read_file(Path::new(url.path())),
            "http" | "https" => http_fetch(&url),
            "unix" => unix_fetch(&url, options),
            _ => Err(RefractError::UnsupportedScheme { locator: self.as_str().to_string() }),
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path)
        .map_err(|source| RefractError::FileRead { path: path.to_path_buf(), source })
}

fn http_fetch(url: &Url) -> Result<Vec<u8>> {
    let fetch_err = |source| RefractError::HttpFetch { url: url.to_string(), source };
    let response = reqwest::blocking::get(url.clone()).map_err(fetch_err)?;
    let response = response.error_for_status().map_err(fetch_err)?;
    let body = response.bytes().map_err(fetch_err)?;
    Ok(body.to_vec())
}

/// GET over a unix domain socket named by the locator's host segment
///
/// The socket file must exist under the configured directory and actually
/// be a socket; both checks fail explicitly. The exchange is a minimal
/// HTTP/1.0 request so the body is everything after the header terminator,
/// read to EOF.
#[cfg(unix)]
fn unix_fetch(url: &Url, options: &FetchOptions) -> Result<Vec<u8>> {
    use std::io::{Read, Write};
    use std::os::unix::fs::FileTypeExt;
    use std::os::unix::net::UnixStream;

    let socket_name = url.host_str().unwrap_or_default();
    let socket_path = options.socket_dir.clone().unwrap_or_default().join(socket_name);
    let metadata = fs::metadata(&socket_path).map_err(|source| RefractError::SocketNotFound {
        path: socket_path.clone(),
        source,
    })?;
    if !metadata.file_type().is_socket() {
        return Err(RefractError::NotASocket { path: socket_path });
    }

    let io_err = |source| RefractError::SocketFetch { url: url.to_string(), source };
    let mut stream = UnixStream::connect(&socket_path).map_err(io_err)?;
    let request_path = if url.path().is_empty() { "/" } else { url.path() };
    write!(
        stream,
        "GET {request_path} HTTP/1.0\r\nHost: {socket_name}\r\nConnection: close\r\n\r\n"
    )
    .map_err(io_err)?;
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).map_err(io_err)?;
    parse_socket_response(url, &raw)
}

#[cfg(not(unix))]
fn unix_fetch(url: &Url, _options: &FetchOptions) -> Result<Vec<u8>> {
    Err(RefractError::UnsupportedScheme { locator: url.to_string() })
}

#[cfg(unix)]
fn parse_socket_response(url: &Url, raw: &[u8]) -> Result<Vec<u8>> {
    let bad = |reason: String| RefractError::SocketResponse { url: url.to_string(), reason };
    let header_end = raw
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .ok_or_else(|| bad("missing header terminator".to_string()))?;
    let head = std::str::from_utf8(&raw[..header_end])
        .map_err(|_| bad("header is not valid UTF-8".to_string()))?;
    let status_line = head.lines().next().unwrap_or_default();
    let status: u16 = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| bad("malformed status line".to_string()))?;
    if !(200..300).contains(&status) {
        return Err(bad(format!("status {status}")));
    }
    Ok(raw[header_end + 4..].to_vec())
}
