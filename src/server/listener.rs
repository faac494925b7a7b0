use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

use crate::config::Config;
use crate::routing::Router;
use crate::server::pool::WorkerPool;
use crate::storage::FileStore;

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    serve(listener, cfg).await
}

/// Accepts connections from `listener` and hands them to the worker pool
/// until accepting fails.
pub async fn serve(listener: TcpListener, cfg: &Config) -> anyhow::Result<()> {
    let store = FileStore::new(cfg.storage.directory.clone());
    info!(directory = %store.root().display(), "Serving files");

    let router = Arc::new(Router::new(store));
    let pool: WorkerPool<TcpStream> = WorkerPool::new(cfg.server.workers, router);

    loop {
        let (socket, peer) = listener.accept().await?;
        debug!("Accepted connection from {}", peer);

        pool.submit(socket, peer).await?;
    }
}
