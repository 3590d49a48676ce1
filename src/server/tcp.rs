//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Un thread acceptor y un pool fijo de workers. El acceptor solo hace
//! `accept` y entrega la conexión al pool; leer, dormir, abrir archivos y
//! escribir ocurre siempre dentro de un worker.

use crate::config::Config;
use crate::error::ServerError;
use crate::server::handler::{handle_connection, ServeContext};
use crate::server::pool::ThreadPool;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Servidor de archivos HTTP/1.1
pub struct Server {
    listener: TcpListener,
    pool: ThreadPool,
    ctx: Arc<ServeContext>,
}

impl Server {
    /// Valida la configuración, hace bind y levanta los workers
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        config.validate()?;

        let root = config.root.canonicalize()?;
        let addr = config
            .address()
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| ServerError::Config(format!("cannot resolve {}", config.address())))?;

        let listener = Self::listen(addr, config.backlog())?;
        let pool = ThreadPool::new(config.workers)?;

        let ctx = ServeContext {
            root,
            delay: config.delay(),
            read_timeout: config.read_timeout(),
        };

        Ok(Self {
            listener,
            pool,
            ctx: Arc::new(ctx),
        })
    }

    fn listen(addr: SocketAddr, backlog: i32) -> io::Result<TcpListener> {
        let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(backlog)?;
        Ok(socket.into())
    }

    /// Dirección real (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn context(&self) -> &ServeContext {
        &self.ctx
    }

    /// Acepta conexiones para siempre
    pub fn run(self) -> Result<(), ServerError> {
        self.accept_loop(None)
    }

    /// Acepta exactamente `n` conexiones, espera a que se atiendan y retorna
    pub fn run_for(self, n: usize) -> Result<(), ServerError> {
        self.accept_loop(Some(n))
    }

    fn accept_loop(self, limit: Option<usize>) -> Result<(), ServerError> {
        let addr = self.local_addr()?;
        info!(
            "Serving {} on {}  workers={}  delay={}s",
            self.ctx.root.display(),
            addr,
            self.pool.size(),
            self.ctx.delay.as_secs_f64()
        );

        if limit == Some(0) {
            return Ok(());
        }

        let mut accepted = 0usize;
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            let ctx = Arc::clone(&self.ctx);
            self.pool.execute(move || {
                if let Err(e) = handle_connection(stream, &ctx) {
                    error!(error = %e, "connection failed");
                }
            })?;

            accepted += 1;
            if limit.is_some_and(|n| accepted >= n) {
                break;
            }
        }

        // Drop del pool: se atiende lo pendiente antes de salir
        Ok(())
    }
}
