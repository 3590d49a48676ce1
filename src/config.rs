//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración por argumentos CLI con respaldo en variables de entorno.
//! Se fija al arrancar y no cambia durante la vida del proceso.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./http_fileserver ./www --port 8001 --workers 4 --delay 0.5
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8001 WORKERS=4 DELAY=0.5 ./http_fileserver ./www
//! ```

use crate::error::ServerError;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Configuración del servidor de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "http_fileserver")]
#[command(about = "Servidor HTTP/1.1 de archivos estáticos (concurrente)")]
#[command(version)]
pub struct Config {
    /// Directorio a servir
    #[arg(env = "SERVE_ROOT")]
    pub root: PathBuf,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8000", env = "HTTP_PORT")]
    pub port: u16,

    /// Número de threads que atienden requests
    #[arg(short, long, default_value = "8", env = "WORKERS")]
    pub workers: usize,

    /// Retardo artificial por request, en segundos
    #[arg(long, default_value = "0", env = "DELAY")]
    pub delay: f64,

    /// Backlog de listen (0 = workers * 2)
    #[arg(long, default_value = "0", env = "BACKLOG")]
    pub backlog: u32,

    /// Timeout de lectura de la cabecera, en segundos (0 = sin timeout)
    #[arg(long = "read-timeout", default_value = "5", env = "READ_TIMEOUT")]
    pub read_timeout: f64,
}

impl Config {
    /// Parsea argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección para bind (host:port)
    ///
    /// ```
    /// use http_fileserver::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Cero si el valor no es representable (ver `validate`)
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or_default()
    }

    /// `None` cuando el timeout está deshabilitado
    pub fn read_timeout(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.read_timeout)
            .ok()
            .filter(|timeout| !timeout.is_zero())
    }

    /// Backlog efectivo para listen
    pub fn backlog(&self) -> i32 {
        let backlog = if self.backlog == 0 {
            self.workers.saturating_mul(2)
        } else {
            self.backlog as usize
        };
        backlog.clamp(1, i32::MAX as usize) as i32
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.workers == 0 {
            return Err(ServerError::Config("workers must be >= 1".to_string()));
        }
        if Duration::try_from_secs_f64(self.delay).is_err() {
            return Err(ServerError::Config(format!(
                "delay must be a non-negative number of seconds, got {}",
                self.delay
            )));
        }
        if Duration::try_from_secs_f64(self.read_timeout).is_err() {
            return Err(ServerError::Config(format!(
                "read timeout must be a non-negative number of seconds, got {}",
                self.read_timeout
            )));
        }
        if !self.root.is_dir() {
            return Err(ServerError::Config(format!(
                "root must be a directory: {}",
                self.root.display()
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: 8,
            delay: 0.0,
            backlog: 0,
            read_timeout: 5.0,
        }
    }
}

/// Argumentos del cliente
#[derive(Debug, Clone, Parser)]
#[command(name = "client")]
#[command(about = "Cliente mínimo: GET de un archivo al servidor")]
pub struct ClientConfig {
    /// Host del servidor
    pub host: String,

    /// Puerto del servidor
    pub port: u16,

    /// Archivo a pedir (con o sin '/' inicial)
    pub path: String,

    /// Carpeta donde se guardan PNG y PDF
    #[arg(long, default_value = "downloads", env = "DOWNLOADS_DIR")]
    pub downloads: PathBuf,
}
