//! # Manejo de una Conexión
//! src/server/handler.rs
//!
//! Un worker atiende una conexión de punta a punta:
//!
//! 1. Leer hasta el final de la cabecera
//! 2. Parsear (400 si falla)
//! 3. Dormir el retardo configurado (simula trabajo del backend)
//! 4. Rechazar métodos distintos de GET (405)
//! 5. Rutear y construir la respuesta (200 / 404 / 500)
//! 6. Escribirla y cerrar la conexión
//!
//! Nada aquí comparte estado mutable con otros workers.

use crate::error::ServerError;
use crate::http::request::read_head;
use crate::http::{Method, ParseError, Request, Response, StatusCode};
use crate::router::{self, Miss, RouteDecision};
use std::fs;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Lo que cada worker necesita para atender; inmutable durante todo el proceso
#[derive(Debug, Clone)]
pub struct ServeContext {
    /// Root ya canonicalizado
    pub root: PathBuf,

    /// Retardo artificial por request
    pub delay: Duration,

    /// Timeout de lectura del socket mientras llega la cabecera
    pub read_timeout: Option<Duration>,
}

impl ServeContext {
    pub fn new(root: PathBuf, delay: Duration) -> Self {
        Self {
            root,
            delay,
            read_timeout: None,
        }
    }
}

/// Atiende una conexión TCP y la cierra pase lo que pase
pub fn handle_connection(mut stream: TcpStream, ctx: &ServeContext) -> io::Result<()> {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let result = stream
        .set_read_timeout(ctx.read_timeout)
        .and_then(|_| serve(&mut stream, ctx, &peer));

    let _ = stream.shutdown(Shutdown::Both);
    result.map(|_| ())
}

/// Lee un request de `stream` y escribe su respuesta
///
/// Devuelve el status enviado, o `None` si el cliente cerró sin mandar nada.
pub fn serve<S: Read + Write>(
    stream: &mut S,
    ctx: &ServeContext,
    peer: &str,
) -> io::Result<Option<StatusCode>> {
    let start = Instant::now();

    let head = match read_head(stream) {
        Ok(head) => head,
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
            warn!(%peer, "timed out waiting for request head");
            let err = ServerError::MalformedRequest(ParseError::IncompleteRequest);
            return write_response(stream, &Response::from_error(&err)).map(Some);
        }
        Err(e) => return Err(e),
    };

    if head.is_empty() {
        debug!(%peer, "connection closed without a request");
        return Ok(None);
    }

    let request = match Request::parse(&head) {
        Ok(request) => request,
        Err(e) => {
            warn!(%peer, error = %e, "malformed request");
            return write_response(stream, &Response::from_error(&e.into())).map(Some);
        }
    };

    if !ctx.delay.is_zero() {
        thread::sleep(ctx.delay);
    }

    let response = response_for(&request, &ctx.root);
    let status = write_response(stream, &response)?;

    info!(
        %peer,
        method = %request.method(),
        target = request.target(),
        version = request.version(),
        status = status.as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request served"
    );

    Ok(Some(status))
}

fn write_response<S: Write>(stream: &mut S, response: &Response) -> io::Result<StatusCode> {
    stream.write_all(&response.to_bytes())?;
    stream.flush()?;
    Ok(response.status())
}

/// Respuesta para un request ya parseado; nunca falla
pub fn response_for(request: &Request, root: &Path) -> Response {
    match resolve(request, root) {
        Ok(response) => response,
        Err(err) => {
            if err.status_code().is_server_error() {
                error!(path = request.path(), error = %err, "failed to build response");
            }
            Response::from_error(&err)
        }
    }
}

fn resolve(request: &Request, root: &Path) -> Result<Response, ServerError> {
    if *request.method() != Method::GET {
        return Err(ServerError::UnsupportedMethod(request.method().to_string()));
    }

    match router::route(request.target(), root) {
        RouteDecision::ServeFile { path, mime } => {
            let body = fs::read(&path)?;
            let mut response = Response::new(StatusCode::Ok)
                .with_header("Content-Type", mime)
                .with_header("Content-Length", &body.len().to_string());
            if let Some(modified) = router::last_modified(&path) {
                response.add_header("Last-Modified", &modified);
            }
            Ok(response.with_body(body))
        }
        RouteDecision::ListDirectory { path } => {
            let page = router::render_listing(&path, request.path())?;
            Ok(Response::html(StatusCode::Ok, page))
        }
        RouteDecision::NotFound(Miss::UnsupportedExtension) => {
            Err(ServerError::UnsupportedExtension(request.path().to_string()))
        }
        RouteDecision::NotFound(_) => Err(ServerError::PathNotFound(request.path().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::parse_response;
    use std::io::Cursor;

    /// Stream en memoria: lee de `input`, acumula lo escrito en `output`
    struct MockStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl MockStream {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        fs::write(dir.path().join("empty.html"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "secret").unwrap();
        fs::create_dir(dir.path().join("books")).unwrap();
        dir
    }

    fn ctx(dir: &tempfile::TempDir) -> ServeContext {
        ServeContext::new(dir.path().canonicalize().unwrap(), Duration::ZERO)
    }

    fn roundtrip(ctx: &ServeContext, raw: &[u8]) -> (Option<StatusCode>, Vec<u8>) {
        let mut stream = MockStream::new(raw);
        let status = serve(&mut stream, ctx, "test").unwrap();
        (status, stream.output)
    }

    #[test]
    fn test_serves_html_file() {
        let dir = fixture();
        let (status, out) = roundtrip(&ctx(&dir), b"GET /index.html HTTP/1.1\r\nHost: x\r\n\r\n");

        assert_eq!(status, Some(StatusCode::Ok));
        let parsed = parse_response(&out).unwrap();
        assert_eq!(parsed.code, 200);
        assert_eq!(parsed.header("content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(parsed.header("connection"), Some("close"));
        assert!(parsed.header("last-modified").is_some());
        assert_eq!(parsed.body, b"<h1>home</h1>");
    }

    #[test]
    fn test_empty_file_still_has_content_length() {
        let dir = fixture();
        let (_, out) = roundtrip(&ctx(&dir), b"GET /empty.html HTTP/1.1\r\n\r\n");

        let parsed = parse_response(&out).unwrap();
        assert_eq!(parsed.code, 200);
        assert_eq!(parsed.header("content-length"), Some("0"));
        assert!(parsed.body.is_empty());
    }

    #[test]
    fn test_directory_listing() {
        let dir = fixture();
        let (_, out) = roundtrip(&ctx(&dir), b"GET / HTTP/1.1\r\n\r\n");

        let parsed = parse_response(&out).unwrap();
        assert_eq!(parsed.code, 200);
        assert_eq!(parsed.header("content-type"), Some("text/html; charset=utf-8"));
        let body = String::from_utf8(parsed.body).unwrap();
        assert!(body.contains("<a href=\"books/\">books</a>"));
        assert!(body.contains("<a href=\"index.html/\">index.html</a>"));
    }

    #[test]
    fn test_unlisted_extension_is_404() {
        let dir = fixture();
        let (status, out) = roundtrip(&ctx(&dir), b"GET /notes.txt HTTP/1.1\r\n\r\n");

        assert_eq!(status, Some(StatusCode::NotFound));
        let parsed = parse_response(&out).unwrap();
        assert!(String::from_utf8_lossy(&parsed.body).contains("Unknown type"));
        assert!(!String::from_utf8_lossy(&out).contains("secret"));
    }

    #[test]
    fn test_missing_is_404() {
        let dir = fixture();
        let (status, _) = roundtrip(&ctx(&dir), b"GET /missing.txt HTTP/1.1\r\n\r\n");
        assert_eq!(status, Some(StatusCode::NotFound));
    }

    #[test]
    fn test_non_get_is_405() {
        let dir = fixture();
        for method in ["POST", "PUT", "DELETE", "HEAD", "BREW"] {
            let raw = format!("{} /index.html HTTP/1.1\r\n\r\n", method);
            let (status, out) = roundtrip(&ctx(&dir), raw.as_bytes());

            assert_eq!(status, Some(StatusCode::MethodNotAllowed), "{}", method);
            assert!(out.starts_with(b"HTTP/1.1 405 Method Not Allowed\r\n"));
        }
    }

    #[test]
    fn test_garbage_is_400() {
        let dir = fixture();
        let (status, out) = roundtrip(&ctx(&dir), b"\x00\x01\x02\x03garbage\r\n\r\n");

        assert_eq!(status, Some(StatusCode::BadRequest));
        let parsed = parse_response(&out).unwrap();
        assert_eq!(parsed.header("content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(parsed.body, b"<!doctype html><h1>400 Bad Request</h1>");
    }

    #[test]
    fn test_truncated_head_is_400() {
        let dir = fixture();
        let (status, _) = roundtrip(&ctx(&dir), b"GET / HTTP/1.1\r\nHost: x\r\n");
        assert_eq!(status, Some(StatusCode::BadRequest));
    }

    #[test]
    fn test_silent_client_gets_nothing() {
        let dir = fixture();
        let (status, out) = roundtrip(&ctx(&dir), b"");
        assert_eq!(status, None);
        assert!(out.is_empty());
    }

    #[test]
    fn test_delay_is_applied() {
        let dir = fixture();
        let mut ctx = ctx(&dir);
        ctx.delay = Duration::from_millis(150);

        let start = Instant::now();
        let (status, _) = roundtrip(&ctx, b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(status, Some(StatusCode::Ok));
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn test_handle_connection_over_tcp() {
        use std::net::TcpListener;

        let dir = fixture();
        let ctx = ctx(&dir);
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(b"GET /index.html HTTP/1.1\r\n\r\n").unwrap();
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).unwrap();
            buf
        });

        let (stream, _) = listener.accept().unwrap();
        assert!(handle_connection(stream, &ctx).is_ok());

        let raw = client.join().unwrap();
        assert_eq!(parse_response(&raw).unwrap().body, b"<h1>home</h1>");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_500() {
        use std::os::unix::fs::PermissionsExt;

        let dir = fixture();
        let locked = dir.path().join("locked.pdf");
        fs::write(&locked, "%PDF").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root puede leer cualquier cosa; en ese caso no hay nada que probar
        if fs::read(&locked).is_ok() {
            return;
        }

        let (status, out) = roundtrip(&ctx(&dir), b"GET /locked.pdf HTTP/1.1\r\n\r\n");
        assert_eq!(status, Some(StatusCode::InternalServerError));
        assert!(out.starts_with(b"HTTP/1.1 500 Internal Server Error\r\n"));
    }
}
