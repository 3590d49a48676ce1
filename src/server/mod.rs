//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! - `tcp`: listener y loop de accept
//! - `pool`: workers de tamaño fijo con cola acotada
//! - `handler`: lo que hace un worker con cada conexión

pub mod handler;
pub mod pool;
pub mod tcp;

pub use handler::{handle_connection, ServeContext};
pub use pool::{PoolError, ThreadPool};
pub use tcp::Server;
