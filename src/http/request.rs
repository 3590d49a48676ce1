//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Parser mínimo de la cabecera de un request.
//!
//! ## Formato
//!
//! ```text
//! GET /books/index.html HTTP/1.1\r\n
//! Host: localhost:8000\r\n
//! \r\n
//! ```
//!
//! Solo se parsea la request line y los headers. El body se ignora: el
//! servidor únicamente sirve GET y cierra la conexión tras responder.

use percent_encoding::percent_decode_str;
use std::io::{self, Read};
use thiserror::Error;

/// Tamaño máximo de la cabecera (request line + headers)
pub const MAX_HEAD_BYTES: usize = 8192;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Método HTTP tal como llegó en la request line
///
/// Nunca se rechaza un método al parsear; la decisión de responder 405 la
/// toma el handler de conexión.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    /// Cualquier otro token (PUT, DELETE, BREW...)
    Other(String),
}

impl Method {
    fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            other => Method::Other(other.to_string()),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errores de parsing; todos corresponden a un request malformado (400)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// La conexión no envió ningún byte útil
    #[error("Empty request")]
    EmptyRequest,

    /// No apareció la línea vacía antes de EOF
    #[error("Incomplete HTTP request: missing blank line after headers")]
    IncompleteRequest,

    /// La cabecera superó `MAX_HEAD_BYTES` sin terminar
    #[error("Request head exceeds 8192 bytes")]
    HeadTooLarge,

    /// La request line no tiene exactamente tres tokens
    #[error("Invalid request line format")]
    InvalidRequestLine,

    /// Header sin ':'
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

/// Request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// request-target crudo, tal como vino en la request line
    target: String,

    /// Path decodificado (sin query ni fragment)
    path: String,

    /// Versión HTTP (ej: "HTTP/1.1")
    version: String,

    /// Headers en el orden en que llegaron
    headers: Vec<(String, String)>,
}

/// Lee del socket hasta encontrar `\r\n\r\n`, EOF o `MAX_HEAD_BYTES`
///
/// No interpreta nada: el resultado se pasa a [`Request::parse`], que decide
/// si la cabecera está completa.
pub fn read_head<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(1024);
    let mut chunk = [0u8; 4096];

    while find_terminator(&data).is_none() && data.len() < MAX_HEAD_BYTES {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
    }

    Ok(data)
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
}

/// Decodifica el path de un request-target
///
/// Quita query (`?`) y fragment (`#`) y luego aplica percent-decoding.
/// Secuencias que no son UTF-8 válido se reemplazan por U+FFFD.
///
/// ```
/// use http_fileserver::http::request::decode_path;
/// assert_eq!(decode_path("/my%20books/a.pdf?x=1"), "/my books/a.pdf");
/// ```
pub fn decode_path(target: &str) -> String {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    percent_decode_str(&target[..end])
        .decode_utf8_lossy()
        .into_owned()
}

impl Request {
    /// Parsea la cabecera de un request
    ///
    /// # Errores
    ///
    /// Falla si no hay línea vacía dentro de `MAX_HEAD_BYTES`, o si la
    /// request line no se divide en exactamente tres tokens.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use http_fileserver::http::Request;
    ///
    /// let raw = b"GET /img/sample.png HTTP/1.1\r\nHost: x\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/img/sample.png");
    /// assert_eq!(request.header("host"), Some("x"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyRequest);
        }

        let head_end = match find_terminator(buffer) {
            Some(pos) if pos + HEAD_TERMINATOR.len() <= MAX_HEAD_BYTES => pos,
            Some(_) => return Err(ParseError::HeadTooLarge),
            None if buffer.len() >= MAX_HEAD_BYTES => return Err(ParseError::HeadTooLarge),
            None => return Err(ParseError::IncompleteRequest),
        };

        // Los headers son ISO-8859-1 en la práctica; no fallamos por bytes raros
        let head = String::from_utf8_lossy(&buffer[..head_end]);
        let mut lines = head.split("\r\n");

        let request_line = lines.next().ok_or(ParseError::InvalidRequestLine)?;
        let (method, target, version) = Self::parse_request_line(request_line)?;
        let headers = Self::parse_headers(lines)?;

        Ok(Request {
            path: decode_path(&target),
            method,
            target,
            version,
            headers,
        })
    }

    /// Formato: `METHOD SP request-target SP HTTP-version`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        Ok((
            Method::parse(parts[0]),
            parts[1].to_string(),
            parts[2].to_string(),
        ))
    }

    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<Vec<(String, String)>, ParseError> {
        let mut headers = Vec::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => {
                    headers.push((name.trim().to_string(), value.trim().to_string()))
                }
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// request-target crudo (sin decodificar)
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Path decodificado
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Busca un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(request.version(), "HTTP/1.1");
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_parse_with_headers() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost:8000\r\nUser-Agent: test\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("Host"), Some("localhost:8000"));
        assert_eq!(request.header("user-agent"), Some("test"));
        assert_eq!(request.headers()[0].0, "Host");
    }

    #[test]
    fn test_path_is_decoded_and_target_kept() {
        let raw = b"GET /my%20books/a%2Bb.pdf?page=2 HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.target(), "/my%20books/a%2Bb.pdf?page=2");
        assert_eq!(request.path(), "/my books/a+b.pdf");
    }

    #[test]
    fn test_unknown_method_is_not_a_parse_error() {
        let raw = b"BREW /pot HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), &Method::Other("BREW".to_string()));
        assert_eq!(request.method().as_str(), "BREW");
    }

    #[test]
    fn test_post_is_parsed() {
        let raw = b"POST /upload HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.method(), &Method::POST);
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(Request::parse(b"").unwrap_err(), ParseError::EmptyRequest);
        assert_eq!(Request::parse(b"\r\n").unwrap_err(), ParseError::EmptyRequest);
    }

    #[test]
    fn test_missing_blank_line() {
        let raw = b"GET / HTTP/1.1\r\nHost: x\r\n";
        assert_eq!(Request::parse(raw).unwrap_err(), ParseError::IncompleteRequest);
    }

    #[test]
    fn test_invalid_request_line() {
        assert_eq!(
            Request::parse(b"GET\r\n\r\n").unwrap_err(),
            ParseError::InvalidRequestLine
        );
        assert_eq!(
            Request::parse(b"GET / HTTP/1.1 extra\r\n\r\n").unwrap_err(),
            ParseError::InvalidRequestLine
        );
    }

    #[test]
    fn test_invalid_header() {
        let raw = b"GET / HTTP/1.1\r\nno-colon-here\r\n\r\n";
        assert!(matches!(
            Request::parse(raw),
            Err(ParseError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_head_too_large() {
        let mut raw = b"GET / HTTP/1.1\r\n".to_vec();
        while raw.len() < MAX_HEAD_BYTES + 10 {
            raw.extend_from_slice(b"X-Filler: aaaaaaaaaaaaaaaaaaaaaaaa\r\n");
        }
        assert_eq!(Request::parse(&raw).unwrap_err(), ParseError::HeadTooLarge);

        raw.extend_from_slice(b"\r\n");
        assert_eq!(Request::parse(&raw).unwrap_err(), ParseError::HeadTooLarge);
    }

    #[test]
    fn test_read_head_stops_at_terminator() {
        let mut input = Cursor::new(b"GET / HTTP/1.1\r\n\r\n".to_vec());
        let head = read_head(&mut input).unwrap();
        assert!(Request::parse(&head).is_ok());
    }

    #[test]
    fn test_read_head_is_bounded() {
        let mut input = Cursor::new(vec![b'a'; MAX_HEAD_BYTES * 4]);
        let head = read_head(&mut input).unwrap();

        assert!(head.len() < MAX_HEAD_BYTES + 4096);
        assert_eq!(Request::parse(&head).unwrap_err(), ParseError::HeadTooLarge);
    }

    #[test]
    fn test_decode_path_strips_fragment() {
        assert_eq!(decode_path("/a.html#top"), "/a.html");
        assert_eq!(decode_path("/%2e%2e/etc"), "/../etc");
    }
}
