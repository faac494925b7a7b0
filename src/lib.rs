//! Courier - HTTP/1.1 echo and file server
//!
//! Core library for request framing, routing, storage and the worker pool.

pub mod config;
pub mod http;
pub mod routing;
pub mod server;
pub mod storage;
