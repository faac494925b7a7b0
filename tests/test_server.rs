//! End-to-end exchanges over real sockets and in-memory streams.

use std::io::{self, Read};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use courier::config::{Config, ServerConfig, StorageConfig};
use courier::http::connection::Connection;
use courier::routing::Router;
use courier::server::listener::serve;
use courier::server::pool::WorkerPool;
use courier::storage::FileStore;
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const DEADLINE: Duration = Duration::from_secs(10);

async fn start_server(workers: usize) -> (TempDir, SocketAddr) {
    let dir = TempDir::new().unwrap();
    let cfg = Config {
        server: ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            workers,
        },
        storage: StorageConfig {
            directory: dir.path().to_path_buf(),
        },
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { serve(listener, &cfg).await });

    (dir, addr)
}

async fn exchange(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut out = Vec::new();
    timeout(DEADLINE, stream.read_to_end(&mut out))
        .await
        .expect("server did not close the connection")
        .unwrap();
    out
}

fn split_response(bytes: &[u8]) -> (String, Vec<u8>) {
    match bytes.windows(4).position(|w| w == b"\r\n\r\n") {
        Some(end) => (
            String::from_utf8_lossy(&bytes[..end]).into_owned(),
            bytes[end + 4..].to_vec(),
        ),
        None => (String::from_utf8_lossy(bytes).into_owned(), Vec::new()),
    }
}

#[tokio::test]
async fn test_echo_over_tcp() {
    let (_dir, addr) = start_server(2).await;

    let response = exchange(addr, b"GET /echo/abc HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

    assert_eq!(
        response,
        b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 3\r\n\r\nabc"
    );
}

#[tokio::test]
async fn test_not_found_over_tcp() {
    let (_dir, addr) = start_server(2).await;

    let response = exchange(addr, b"GET /missing HTTP/1.1\r\n\r\n").await;

    assert_eq!(response, b"HTTP/1.1 404 Not Found\r\n\r\n");
}

#[tokio::test]
async fn test_gzip_echo_over_tcp() {
    let (_dir, addr) = start_server(2).await;

    let response = exchange(
        addr,
        b"GET /echo/hello HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n",
    )
    .await;
    let (head, body) = split_response(&response);

    assert!(head.contains("Content-Encoding: gzip"));
    let mut decoded = String::new();
    flate2::read::GzDecoder::new(&body[..])
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, "hello");
}

#[tokio::test]
async fn test_missing_line_feed_gets_server_error() {
    let (_dir, addr) = start_server(2).await;

    let response = exchange(addr, b"GET / HTTP/1.1\r\nHost: x\r!").await;

    assert_eq!(response, b"HTTP/1.1 500 Internal Server Error\r\n\r\n");
}

#[tokio::test]
async fn test_unsupported_method_gets_server_error() {
    let (_dir, addr) = start_server(2).await;

    let response = exchange(addr, b"DELETE /files/a HTTP/1.1\r\n\r\n").await;

    assert_eq!(response, b"HTTP/1.1 500 Internal Server Error\r\n\r\n");
}

#[tokio::test]
async fn test_file_round_trip_over_tcp() {
    let (dir, addr) = start_server(2).await;

    let created = exchange(
        addr,
        b"POST /files/foo HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello files",
    )
    .await;
    assert_eq!(created, b"HTTP/1.1 201 Created\r\n\r\n");
    assert_eq!(std::fs::read(dir.path().join("foo")).unwrap(), b"hello files");

    let read = exchange(addr, b"GET /files/foo HTTP/1.1\r\n\r\n").await;
    let (head, body) = split_response(&read);
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(head.contains("Content-Type: application/octet-stream"));
    assert_eq!(body, b"hello files");
}

#[tokio::test]
async fn test_storage_failure_gets_server_error() {
    let (dir, addr) = start_server(2).await;
    std::fs::create_dir(dir.path().join("subdir")).unwrap();

    let response = exchange(addr, b"GET /files/subdir HTTP/1.1\r\n\r\n").await;

    assert_eq!(response, b"HTTP/1.1 500 Internal Server Error\r\n\r\n");
}

async fn round_trip(addr: SocketAddr, id: usize) {
    let payload = format!("payload from client {}", id);
    let post = format!(
        "POST /files/client-{} HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
        id,
        payload.len(),
        payload
    );

    let created = exchange(addr, post.as_bytes()).await;
    assert_eq!(created, b"HTTP/1.1 201 Created\r\n\r\n");

    let get = format!("GET /files/client-{} HTTP/1.1\r\n\r\n", id);
    let read = exchange(addr, get.as_bytes()).await;
    let (_, body) = split_response(&read);
    assert_eq!(body, payload.as_bytes());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_round_trips_within_pool_size() {
    let (_dir, addr) = start_server(8).await;

    let clients: Vec<_> = (0..8).map(|id| tokio::spawn(round_trip(addr, id))).collect();
    for client in clients {
        timeout(DEADLINE, client).await.unwrap().unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_round_trips_beyond_pool_size() {
    let (_dir, addr) = start_server(2).await;

    let clients: Vec<_> = (0..16).map(|id| tokio::spawn(round_trip(addr, id))).collect();
    for client in clients {
        timeout(DEADLINE, client).await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_stalled_client_holds_only_its_worker() {
    let (_dir, addr) = start_server(2).await;

    let mut stalled = TcpStream::connect(addr).await.unwrap();
    stalled.write_all(b"GET /echo/slow HTTP/1.1\r\nHost:").await.unwrap();

    let response = exchange(addr, b"GET /echo/fast HTTP/1.1\r\n\r\n").await;
    let (_, body) = split_response(&response);
    assert_eq!(body, b"fast");

    drop(stalled);
}

#[tokio::test]
async fn test_connection_over_duplex_stream() {
    let dir = TempDir::new().unwrap();
    let router = Arc::new(Router::new(FileStore::new(dir.path())));
    let (mut client, server) = tokio::io::duplex(4096);

    let task = tokio::spawn(Connection::new(server, router).run());

    client
        .write_all(b"GET /user-agent HTTP/1.1\r\nUser-Agent: foo/1.0\r\n\r\n")
        .await
        .unwrap();
    let mut out = Vec::new();
    timeout(DEADLINE, client.read_to_end(&mut out))
        .await
        .unwrap()
        .unwrap();
    task.await.unwrap();

    assert_eq!(
        out,
        b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 7\r\n\r\nfoo/1.0"
    );
}

#[tokio::test]
async fn test_connection_closed_before_request() {
    let dir = TempDir::new().unwrap();
    let router = Arc::new(Router::new(FileStore::new(dir.path())));
    let (mut client, server) = tokio::io::duplex(64);

    let task = tokio::spawn(Connection::new(server, router).run());
    client.shutdown().await.unwrap();

    let mut out = Vec::new();
    timeout(DEADLINE, client.read_to_end(&mut out))
        .await
        .unwrap()
        .unwrap();
    task.await.unwrap();

    assert_eq!(out, b"HTTP/1.1 500 Internal Server Error\r\n\r\n");
}

#[tokio::test]
async fn test_pool_shutdown_drains_queued_connections() {
    let dir = TempDir::new().unwrap();
    let router = Arc::new(Router::new(FileStore::new(dir.path())));
    let pool = WorkerPool::new(1, router);
    let peer: SocketAddr = "127.0.0.1:0".parse().unwrap();

    let (mut client, server) = tokio::io::duplex(4096);
    client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    pool.submit(server, peer).await.unwrap();
    assert_eq!(pool.size(), 1);

    timeout(DEADLINE, pool.shutdown()).await.unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    assert_eq!(out, b"HTTP/1.1 200 OK\r\n\r\n");
}

/// Serves a fixed request, accepts `first_write` bytes of the response, then
/// fails the next write. Later writes succeed and are recorded.
struct FlakyStream {
    input: &'static [u8],
    first_write: usize,
    writes: usize,
    sent: Arc<Mutex<Vec<u8>>>,
}

impl AsyncRead for FlakyStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let n = buf.remaining().min(this.input.len());
        buf.put_slice(&this.input[..n]);
        this.input = &this.input[n..];
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for FlakyStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        this.writes += 1;
        let n = match this.writes {
            1 => buf.len().min(this.first_write),
            2 => return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into())),
            _ => buf.len(),
        };
        this.sent.lock().unwrap().extend_from_slice(&buf[..n]);
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn test_failed_response_write_is_not_followed_by_server_error() {
    let dir = TempDir::new().unwrap();
    let router = Arc::new(Router::new(FileStore::new(dir.path())));
    let sent = Arc::new(Mutex::new(Vec::new()));
    let stream = FlakyStream {
        input: b"GET /echo/abc HTTP/1.1\r\n\r\n",
        first_write: 12,
        writes: 0,
        sent: Arc::clone(&sent),
    };

    timeout(DEADLINE, Connection::new(stream, router).run())
        .await
        .unwrap();

    assert_eq!(sent.lock().unwrap().as_slice(), b"HTTP/1.1 200");
}
