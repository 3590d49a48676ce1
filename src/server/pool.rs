//! # Pool de Workers
//! src/server/pool.rs
//!
//! Número fijo de threads que sacan trabajos de una cola compartida.
//!
//! ```text
//! acceptor ──execute()──► [ mpsc::channel ] ──► worker-0
//!                                          ──► worker-1
//!                                          ──► worker-N
//! ```
//!
//! El límite de concurrencia es la cantidad de workers. `execute` nunca
//! bloquea, así el acceptor solo espera en `accept`; con todos los workers
//! ocupados las conexiones esperan en la cola hasta que uno se libere.
//! Un trabajo que hace panic no mata a su worker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("worker pool size must be >= 1")]
    ZeroWorkers,

    #[error("worker pool is shut down")]
    Closed,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}

/// Pool de tamaño fijo; al hacer drop espera a que terminen los trabajos encolados
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: Option<Sender<Job>>,
}

struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(id: usize, receiver: Arc<Mutex<Receiver<Job>>>) -> Result<Self, PoolError> {
        let handle = thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || worker_loop(id, receiver))
            .map_err(|e| PoolError::Spawn(e.to_string()))?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

fn worker_loop(id: usize, receiver: Arc<Mutex<Receiver<Job>>>) {
    debug!(worker = id, "worker started");

    loop {
        // El lock se suelta antes de ejecutar el trabajo
        let message = match receiver.lock() {
            Ok(guard) => guard.recv(),
            Err(poisoned) => poisoned.into_inner().recv(),
        };

        match message {
            Ok(job) => {
                debug!(worker = id, "picked up job");
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                    error!(worker = id, "job panicked: {}", panic_message(payload.as_ref()));
                }
            }
            Err(_) => {
                debug!(worker = id, "queue closed, worker exiting");
                break;
            }
        }
    }
}

impl ThreadPool {
    /// Crea `size` workers
    pub fn new(size: usize) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::ZeroWorkers);
        }

        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            workers.push(Worker::spawn(id, Arc::clone(&receiver))?);
        }

        Ok(Self {
            workers,
            sender: Some(sender),
        })
    }

    /// Encola un trabajo sin esperar a que un worker lo tome
    pub fn execute<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(PoolError::Closed)?;
        sender.send(Box::new(job)).map_err(|_| PoolError::Closed)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Cerrar la cola: los workers vacían lo pendiente y salen
        drop(self.sender.take());

        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    error!(worker = worker.id, "worker thread panicked");
                }
            }
        }
    }
}
