//! The ephemeral serving phase: a static file loop bound to localhost plus
//! scoped cleanup of the generated artifacts.
//!
//! `ArtifactGuard` owns the artifact paths and removes them on drop, so the
//! files disappear on every exit path of the serving phase: normal return
//! after Ctrl-C, an error inside the loop, or a panic unwinding through it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Scoped ownership of generated files. Dropping the guard deletes them.
#[derive(Debug, Default)]
pub struct ArtifactGuard {
    paths: Vec<PathBuf>,
}

impl ArtifactGuard {
    pub fn new() -> ArtifactGuard {
        ArtifactGuard::default()
    }

    /// Registers a file for removal when the guard drops.
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => log::debug!("removed '{}'", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("failed to remove '{}': {}", path.display(), e),
            }
        }
    }
}

/// A static file served at a fixed URL path.
#[derive(Debug, Clone)]
pub struct StaticRoute {
    pub url_path: &'static str,
    pub file: PathBuf,
    pub content_type: &'static str,
}

/// Serves `routes` on `127.0.0.1:<port>` until interrupted. Returns `Ok(())`
/// when Ctrl-C resolves the accept loop.
pub fn serve(port: u16, routes: Vec<StaticRoute>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
        .context("failed to start the async runtime")?;

    runtime.block_on(async move {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {port}"))?;
        println!("Serving at http://localhost:{port}/ (Ctrl-C to stop)");

        loop {
            tokio::select! {
                interrupt = tokio::signal::ctrl_c() => {
                    interrupt.context("failed to listen for the interrupt signal")?;
                    log::info!("interrupted, shutting down");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    let (stream, peer) = accepted.context("failed to accept a connection")?;
                    if let Err(e) = handle_connection(stream, &routes).await {
                        log::debug!("connection from {peer} failed: {e}");
                    }
                }
            }
        }
    })
}

async fn handle_connection(mut stream: TcpStream, routes: &[StaticRoute]) -> std::io::Result<()> {
    // Only the request line matters; GET requests carry no body.
    let mut buf = [0u8; 4096];
    let n = stream.read(&mut buf).await?;
    let head = String::from_utf8_lossy(&buf[..n]);
    let mut parts = head.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/");

    match find_route(routes, method, target) {
        Some(route) => match tokio::fs::read(&route.file).await {
            Ok(body) => {
                let header = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    route.content_type,
                    body.len()
                );
                stream.write_all(header.as_bytes()).await?;
                stream.write_all(&body).await?;
            }
            Err(_) => write_status(&mut stream, "404 Not Found").await?,
        },
        None if method != "GET" => write_status(&mut stream, "405 Method Not Allowed").await?,
        None => write_status(&mut stream, "404 Not Found").await?,
    }
    stream.shutdown().await
}

fn find_route<'a>(
    routes: &'a [StaticRoute],
    method: &str,
    target: &str,
) -> Option<&'a StaticRoute> {
    if method != "GET" {
        return None;
    }
    let path = target.split('?').next().unwrap_or("/");
    routes.iter().find(|r| r.url_path == path)
}

async fn write_status(stream: &mut TcpStream, status: &str) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{status}",
        status.len()
    );
    stream.write_all(response.as_bytes()).await
}
