//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: image/png\r\n
//! Content-Length: 1043\r\n
//! Connection: close\r\n
//! \r\n
//! <bytes>
//! ```
//!
//! `build_response` es la serialización pura: misma entrada, mismos bytes.
//! `Response` es el builder que usan los handlers; al serializar agrega
//! `Date` y `Server` si no están.
//!
//! ```
//! use http_fileserver::http::{Response, StatusCode};
//!
//! let bytes = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/html; charset=utf-8")
//!     .with_body(b"<h1>hola</h1>".to_vec())
//!     .to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use super::StatusCode;
use crate::error::ServerError;
use std::time::SystemTime;

/// Valor del header `Server`
pub const SERVER_NAME: &str = "TinyRs/0.2";

/// Serializa una respuesta HTTP/1.1
///
/// Los headers se emiten en el orden recibido. `Connection` siempre sale
/// como `close` (un valor del caller se ignora), y `Content-Length` se agrega
/// cuando el body no está vacío y el caller no lo puso.
pub fn build_response(code: u16, reason: &str, headers: &[(String, String)], body: &[u8]) -> Vec<u8> {
    let has = |name: &str| headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name));

    let mut out = Vec::with_capacity(128 + body.len());
    out.extend_from_slice(format!("HTTP/1.1 {} {}\r\n", code, reason).as_bytes());

    for (name, value) in headers {
        if name.eq_ignore_ascii_case("Connection") {
            continue;
        }
        out.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
    }
    out.extend_from_slice(b"Connection: close\r\n");
    if !body.is_empty() && !has("Content-Length") {
        out.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
    }

    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

/// Respuesta HTTP en construcción
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// Headers en orden de inserción (la salida es byte a byte reproducible)
    headers: Vec<(String, String)>,

    body: Vec<u8>,
}

impl Response {
    /// Respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Agrega o reemplaza un header (builder)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega o reemplaza un header; si ya existe conserva su posición
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el body; `Content-Length` se calcula al serializar
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Página HTML (listados y errores)
    pub fn html(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body.into())
    }

    /// 404 estándar
    pub fn not_found() -> Self {
        Self::html(StatusCode::NotFound, "<!doctype html><h1>404 Not Found</h1>")
    }

    /// Traduce un error del servidor a la respuesta que ve el cliente
    pub fn from_error(err: &ServerError) -> Self {
        match err {
            ServerError::UnsupportedExtension(_) => Self::html(
                StatusCode::NotFound,
                "<!doctype html><h1>404 Not Found</h1><p>Unknown type</p>",
            ),
            ServerError::PathNotFound(_) => Self::not_found(),
            ServerError::MalformedRequest(_) => {
                Self::html(StatusCode::BadRequest, "<!doctype html><h1>400 Bad Request</h1>")
            }
            ServerError::UnsupportedMethod(_) => Self::html(
                StatusCode::MethodNotAllowed,
                "<!doctype html><h1>405 Method Not Allowed</h1><p>only GET</p>",
            )
            .with_header("Allow", "GET"),
            ServerError::Io(_) | ServerError::Config(_) | ServerError::Pool(_) => Self::html(
                StatusCode::InternalServerError,
                "<!doctype html><h1>500 Internal Server Error</h1>",
            ),
        }
    }

    /// Serializa agregando `Date` y `Server` si faltan
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut headers = self.headers.clone();
        if !headers.iter().any(|(n, _)| n.eq_ignore_ascii_case("Date")) {
            headers.insert(0, ("Date".to_string(), httpdate::fmt_http_date(SystemTime::now())));
        }
        if !headers.iter().any(|(n, _)| n.eq_ignore_ascii_case("Server")) {
            headers.insert(1, ("Server".to_string(), SERVER_NAME.to_string()));
        }

        build_response(
            self.status.as_u16(),
            self.status.reason_phrase(),
            &headers,
            &self.body,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
