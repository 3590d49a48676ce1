//! # HTTP File Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 de archivos estáticos escrito directamente sobre
//! sockets TCP, con un pool fijo de workers y un retardo artificial por
//! request para poder observar la concurrencia. Incluye un cliente mínimo.
//!
//! ## Arquitectura
//!
//! - `http`: parsing de requests y construcción de responses
//! - `router`: path → archivo / listado / 404, sin salir del root
//! - `server`: acceptor, pool de workers y manejo de cada conexión
//! - `config`: argumentos CLI (servidor y cliente)
//! - `client`: contraparte que pide un archivo y lo guarda o imprime
//! - `error`: errores y su traducción a status HTTP
//! - `logging`: inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use http_fileserver::config::Config;
//! use http_fileserver::server::Server;
//!
//! let config = Config {
//!     root: "./www".into(),
//!     workers: 4,
//!     ..Config::default()
//! };
//! let server = Server::bind(&config).expect("bind");
//! server.run().expect("server");
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;
