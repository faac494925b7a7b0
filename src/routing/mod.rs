//! Request routing
//!
//! This module classifies request targets into a fixed set of routes and
//! dispatches them to the echo, user-agent and file handlers.

pub mod handlers;
pub mod router;

pub use handlers::HandlerError;
pub use router::{Route, Router};
