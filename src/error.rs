//! # Errores del Servidor
//! src/error.rs
//!
//! Taxonomía de fallos de un request. Ninguno se propaga fuera del worker:
//! el handler de conexión los convierte en una respuesta con
//! [`Response::from_error`](crate::http::Response::from_error).

use crate::http::{ParseError, StatusCode};
use crate::server::PoolError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Cabecera ilegible → 400
    #[error("Malformed request: {0}")]
    MalformedRequest(#[from] ParseError),

    /// El path no existe o escapa del root → 404
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Existe pero su extensión no está en la lista permitida → 404
    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),

    /// Método distinto de GET → 405
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Fallo de filesystem al leer un recurso válido → 500
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuración inválida al arrancar
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// El pool de workers no acepta más trabajo
    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),
}

impl ServerError {
    /// Código HTTP que corresponde a este error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::MalformedRequest(_) => StatusCode::BadRequest,
            ServerError::PathNotFound(_) | ServerError::UnsupportedExtension(_) => {
                StatusCode::NotFound
            }
            ServerError::UnsupportedMethod(_) => StatusCode::MethodNotAllowed,
            ServerError::Io(_) | ServerError::Config(_) | ServerError::Pool(_) => {
                StatusCode::InternalServerError
            }
        }
    }
}
