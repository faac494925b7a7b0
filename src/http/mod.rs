//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 subset the server speaks: one
//! request and one response per connection, GET and POST only, bodies
//! framed by `Content-Length`.
//!
//! # Architecture
//!
//! - **`reader`**: Delimiter-bounded and exact-length reads over a buffered stream
//! - **`parser`**: Turns the byte stream into a `Request`
//! - **`headers`**: Ordered raw header lines with the decoded fields the server uses
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`encoding`**: Content-encoding negotiation and the gzip codec
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`connection`**: The per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │  Accepted   │ ← Read and parse the request
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Parsed    │ ← Classify the target
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Routed    │ ← Run the handler
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Handled   │ ← Negotiate encoding, serialize
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │ Serialized  │ ← Write to the client
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Written   │
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Closed    │
//!        └─────────────┘
//! ```
//!
//! A failure in any state from `Accepted` through `Handled` moves to `Failed`,
//! which writes a fixed 500 response once and then closes. A write failure in
//! `Serialized` closes without the 500, since part of the response may
//! already have been sent.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use courier::http::connection::Connection;
//! use courier::routing::Router;
//! use courier::storage::FileStore;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:4221").await?;
//!     let router = Arc::new(Router::new(FileStore::new("/tmp")));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let router = Arc::clone(&router);
//!         tokio::spawn(Connection::new(socket, router).run());
//!     }
//! }
//! ```

pub mod connection;
pub mod encoding;
pub mod headers;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod writer;
