//! Integration tests for locator fetching over live local transports.
//!
//! These tests verify that:
//! - `http://` locators fetch over TCP and non-2xx statuses abort load
//! - `unix://` locators discover sockets through `SOCKET_DIR`
//! - Template construction is the only point that touches the transport

use anyhow::Result;
use serde_json::json;
use serial_test::serial;

use refract::{ENV_SOCKET_DIR, FetchOptions, RefractError, Template};

use crate::common::{init_logging, serve_http_once};

/// Fetch a template over HTTP and render it; the server is gone by render
/// time, proving fetch happened at construction.
#[test]
fn fetches_templates_over_http() -> Result<()> {
    init_logging();

    let (base, server) = serve_http_once("HTTP/1.1 200 OK", "hello {{ who }}");
    let template = Template::load(
        format!("{base}/templates/greeting.tpl"),
        FetchOptions { socket_dir: None },
    )?;
    server.join().unwrap();

    assert_eq!(template.render(&json!({ "who": "http" }))?, "hello http");
    Ok(())
}

/// A non-2xx response aborts construction with a typed fetch error.
#[test]
fn non_2xx_http_responses_abort_load() -> Result<()> {
    init_logging();

    let (base, server) = serve_http_once("HTTP/1.1 404 Not Found", "gone");
    let result = Template::load(
        format!("{base}/absent.tpl"),
        FetchOptions { socket_dir: None },
    );
    server.join().unwrap();

    assert!(matches!(result, Err(RefractError::HttpFetch { .. })));
    Ok(())
}

/// End-to-end `unix://` fetch with the socket directory supplied through
/// the environment, the way the surrounding tooling configures it.
#[cfg(unix)]
#[test]
#[serial]
fn fetches_templates_over_a_unix_socket_from_the_env_directory() -> Result<()> {
    use std::io::{Read, Write};
    use std::os::unix::net::UnixListener;

    init_logging();

    let dir = tempfile::tempdir()?;
    let listener = UnixListener::bind(dir.path().join("reflector"))?;
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = [0u8; 1024];
        let _ = stream.read(&mut request).unwrap();
        stream
            .write_all(b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nsocket says {{ who }}")
            .unwrap();
    });

    // SAFETY: guarded by #[serial]; no other thread reads the environment
    // while this test mutates it.
    unsafe { std::env::set_var(ENV_SOCKET_DIR, dir.path()) };
    let template = Template::load("unix://reflector/main.tpl", FetchOptions::default());
    unsafe { std::env::remove_var(ENV_SOCKET_DIR) };
    server.join().unwrap();

    assert_eq!(template?.render(&json!({ "who": "hi" }))?, "socket says hi");
    Ok(())
}

/// Without a configured socket directory the `unix://` scheme fails
/// explicitly instead of probing the filesystem root.
#[cfg(unix)]
#[test]
#[serial]
fn unix_fetch_without_a_socket_directory_fails() -> Result<()> {
    init_logging();

    // SAFETY: guarded by #[serial]; no other thread reads the environment
    // while this test mutates it.
    unsafe { std::env::remove_var(ENV_SOCKET_DIR) };
    let result = Template::load("unix://reflector/main.tpl", FetchOptions::default());
    assert!(matches!(result, Err(RefractError::SocketNotFound { .. })));
    Ok(())
}
