//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Subconjunto de HTTP/1.1 implementado a mano sobre el socket:
//!
//! - Parsing de la cabecera del request (request line + headers)
//! - Construcción de responses con `Connection: close`
//! - Status codes que emite el servidor
//!
//! No hay keep-alive, pipelining, chunked encoding ni rangos: un request
//! por conexión.

pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, ParseError, Request};
pub use response::{build_response, Response};
pub use status::StatusCode;
