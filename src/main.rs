//! # HTTP File Server - Entry Point
//! src/main.rs
//!
//! `http_fileserver <root> [--host H] [--port P] [--workers N] [--delay S]`

use http_fileserver::config::Config;
use http_fileserver::error::ServerError;
use http_fileserver::logging;
use http_fileserver::server::Server;
use tracing::error;

fn main() {
    logging::init_logging();

    let config = Config::new();

    let server = match Server::bind(&config) {
        Ok(server) => server,
        Err(e @ ServerError::Config(_)) => {
            error!("{}", e);
            std::process::exit(2);
        }
        Err(e) => {
            error!("failed to start on {}: {}", config.address(), e);
            std::process::exit(1);
        }
    };

    // Bloquea el thread principal: este es el acceptor
    if let Err(e) = server.run() {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
