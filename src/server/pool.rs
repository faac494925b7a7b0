//! Bounded pool of connection workers.
//!
//! The acceptor hands streams over a channel with one slot per worker.
//! Once every worker is busy and every slot is taken, `submit` waits, which
//! is the only admission control. There are no per-connection deadlines, so
//! a client that stalls mid-request holds its worker until it disconnects.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::http::connection::Connection;
use crate::routing::Router;

/// A connection waiting for a worker.
struct Job<S> {
    stream: S,
    peer: SocketAddr,
}

#[derive(Debug, Error)]
#[error("worker pool is shut down")]
pub struct PoolClosed;

pub struct WorkerPool<S> {
    sender: mpsc::Sender<Job<S>>,
    workers: Vec<JoinHandle<()>>,
}

impl<S> WorkerPool<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Starts `size` workers sharing `router`.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: usize, router: Arc<Router>) -> Self {
        assert!(size > 0);

        let (sender, receiver) = mpsc::channel(size);
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| spawn_worker(id, Arc::clone(&receiver), Arc::clone(&router)))
            .collect();

        tracing::info!(workers = size, "worker pool started");
        Self { sender, workers }
    }

    /// Queues a connection, waiting while the pool is saturated.
    pub async fn submit(&self, stream: S, peer: SocketAddr) -> Result<(), PoolClosed> {
        self.sender
            .send(Job { stream, peer })
            .await
            .map_err(|_| PoolClosed)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Stops accepting work and waits for queued connections to finish.
    pub async fn shutdown(self) {
        drop(self.sender);

        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "worker exited abnormally");
            }
        }
    }
}

fn spawn_worker<S>(
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Job<S>>>>,
    router: Arc<Router>,
) -> JoinHandle<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let job = receiver.lock().await.recv().await;

            let Some(Job { stream, peer }) = job else {
                tracing::debug!(worker = id, "worker stopping");
                break;
            };

            let span = tracing::info_span!("connection", %peer, worker = id);
            let conn = Connection::new(stream, Arc::clone(&router));

            // A panicking exchange takes down its own task only.
            if let Err(e) = tokio::spawn(conn.run().instrument(span)).await {
                tracing::error!(worker = id, %peer, error = %e, "connection task panicked");
            }
        }
    })
}
