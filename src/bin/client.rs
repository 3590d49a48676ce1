//! # Cliente
//! src/bin/client.rs
//!
//! `client <host> <port> <path> [--downloads DIR]`
//!
//! HTML se imprime en stdout; PNG y PDF se guardan en `downloads/`.
//! Sale con código 1 si el servidor no respondió 200.

use clap::Parser;
use http_fileserver::client::{self, Outcome};
use http_fileserver::config::ClientConfig;
use http_fileserver::logging;
use std::io;
use tracing::error;

fn main() {
    logging::init_logging_with_level("warn");

    let config = ClientConfig::parse();

    let response = match client::fetch(&config.host, config.port, &config.path) {
        Ok(response) => response,
        Err(e) => {
            error!("request to {}:{} failed: {}", config.host, config.port, e);
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    match client::save_or_print(&response, &config.path, &config.downloads, &mut stdout.lock()) {
        Ok(Outcome::Failed(_)) => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            error!("could not handle response: {}", e);
            std::process::exit(1);
        }
    }
}
