//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing`. El nivel se controla con `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=debug ./http_fileserver ./www     # incluye arranque y parada de workers
//! RUST_LOG=warn  ./http_fileserver ./www     # solo errores y requests malformados
//! ```
//!
//! Los logs van a stderr para que el cliente pueda imprimir bodies en stdout.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging con nivel `info` salvo que `RUST_LOG` diga otra cosa
pub fn init_logging() {
    init_logging_with_level("info");
}

/// Logging con un nivel por defecto explícito
///
/// Llamar una sola vez al arrancar; una segunda llamada se ignora.
pub fn init_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
