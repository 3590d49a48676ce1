//! # Cliente HTTP mínimo
//! src/client.rs
//!
//! Abre un socket, manda una línea GET, lee hasta EOF y decide qué hacer
//! con el body según su Content-Type. El parser de respuestas es
//! independiente del codec del servidor.

use std::fs;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Respuesta parseada del lado del cliente
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    pub code: u16,
    pub reason: String,
    /// Nombres en minúsculas, en el orden recibido
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ParsedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or("")
    }
}

/// Parsea una respuesta HTTP/1.x completa (status line, headers, body)
///
/// Si hay `Content-Length` el body se recorta a ese largo.
pub fn parse_response(raw: &[u8]) -> Result<ParsedResponse, ClientError> {
    let split = raw.windows(4).position(|w| w == b"\r\n\r\n");
    let (head, rest) = match split {
        Some(pos) => (&raw[..pos], &raw[pos + 4..]),
        None => (raw, &raw[raw.len()..]),
    };

    let head = String::from_utf8_lossy(head);
    let mut lines = head.split("\r\n");

    let status_line = lines.next().unwrap_or_default();
    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(ClientError::MalformedResponse(format!("bad status line: {:?}", status_line)));
    }
    let code = parts
        .next()
        .and_then(|c| c.parse::<u16>().ok())
        .ok_or_else(|| ClientError::MalformedResponse(format!("bad status code: {:?}", status_line)))?;
    let reason = parts.next().unwrap_or_default().to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let mut body = rest.to_vec();
    let declared = headers
        .iter()
        .find(|(n, _)| n == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok());
    if let Some(len) = declared {
        body.truncate(len);
    }

    Ok(ParsedResponse {
        code,
        reason,
        headers,
        body,
    })
}

/// Bytes del request que manda el cliente
pub fn request_bytes(host: &str, path: &str) -> Vec<u8> {
    format!(
        "GET /{} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path.trim_start_matches('/'),
        host
    )
    .into_bytes()
}

/// Pide `path` al servidor y devuelve la respuesta parseada
pub fn fetch(host: &str, port: u16, path: &str) -> Result<ParsedResponse, ClientError> {
    let mut stream = TcpStream::connect((host, port))?;
    stream.set_read_timeout(Some(CLIENT_TIMEOUT))?;
    stream.set_write_timeout(Some(CLIENT_TIMEOUT))?;

    stream.write_all(&request_bytes(host, path))?;
    stream.flush()?;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw)?;

    parse_response(&raw)
}

/// Qué hizo el cliente con la respuesta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Status distinto de 200
    Failed(u16),
    /// HTML impreso en la salida
    Printed,
    /// Binario guardado en disco
    Saved(PathBuf),
    /// Content-Type que el cliente no sabe manejar
    Unknown,
}

/// Imprime HTML, guarda PNG/PDF en `downloads`, reporta el resto
pub fn save_or_print<W: Write>(
    response: &ParsedResponse,
    path: &str,
    downloads: &Path,
    out: &mut W,
) -> Result<Outcome, ClientError> {
    if response.code != 200 {
        writeln!(out, "HTTP {}\n{}", response.code, String::from_utf8_lossy(&response.body))?;
        return Ok(Outcome::Failed(response.code));
    }

    let ctype = response.content_type();
    if ctype.starts_with("text/html") {
        writeln!(out, "{}", String::from_utf8_lossy(&response.body))?;
        Ok(Outcome::Printed)
    } else if ctype.starts_with("image/png") || ctype.starts_with("application/pdf") {
        let name = Path::new(path.trim_end_matches('/'))
            .file_name()
            .ok_or_else(|| ClientError::MalformedResponse(format!("no file name in {:?}", path)))?;
        fs::create_dir_all(downloads)?;
        let dest = downloads.join(name);
        fs::write(&dest, &response.body)?;
        writeln!(out, "Saved {} to {}", ctype, dest.display())?;
        Ok(Outcome::Saved(dest))
    } else {
        writeln!(out, "Unknown content-type {}, length={}", ctype, response.body.len())?;
        Ok(Outcome::Unknown)
    }
}
