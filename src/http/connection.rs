use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::http::parser::parse_request;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::{ResponseWriter, SERVER_ERROR_RESPONSE};
use crate::routing::{Route, Router};

/// One request/response exchange over a single stream.
pub struct Connection<S> {
    stream: BufReader<S>,
    router: Arc<Router>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Accepted,
    Parsed(Request),
    Routed(Request, Route),
    Handled(Request, Response),
    Serialized(ResponseWriter, Outcome),
    Written(Outcome),
    Failed(anyhow::Error),
    Closed,
}

/// What the exchange answered, logged once the response is on the wire.
pub struct Outcome {
    method: &'static str,
    target: String,
    status: u16,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>) -> Self {
        Self {
            stream: BufReader::new(stream),
            router,
            state: ConnectionState::Accepted,
        }
    }

    /// Drives the exchange to `Closed`.
    ///
    /// Any failure before the response is serialized is answered with a
    /// fixed 500, written at most once. A failed response write only closes.
    /// The stream is shut down on every path.
    pub async fn run(mut self) {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Accepted => match parse_request(&mut self.stream).await {
                    Ok(req) => ConnectionState::Parsed(req),
                    Err(e) => ConnectionState::Failed(e.into()),
                },

                ConnectionState::Parsed(req) => {
                    let route = Route::classify(req.target());
                    debug!(?route, target = %req.target_lossy(), "route classified");
                    ConnectionState::Routed(req, route)
                }

                ConnectionState::Routed(req, route) => match self.router.handle(route, &req).await {
                    Ok(response) => ConnectionState::Handled(req, response),
                    Err(e) => ConnectionState::Failed(e.into()),
                },

                ConnectionState::Handled(req, response) => {
                    let outcome = Outcome {
                        method: req.method().as_str(),
                        target: req.target_lossy().into_owned(),
                        status: response.status.as_u16(),
                    };

                    match ResponseWriter::new(response, Some(req.headers())) {
                        Ok(writer) => ConnectionState::Serialized(writer, outcome),
                        Err(e) => ConnectionState::Failed(e.into()),
                    }
                }

                // Part of the response may already be on the wire, so a
                // failed write closes without the fixed 500.
                ConnectionState::Serialized(mut writer, outcome) => {
                    match writer.write_to_stream(self.stream.get_mut()).await {
                        Ok(()) => ConnectionState::Written(outcome),
                        Err(e) => {
                            warn!(
                                error = %e,
                                method = outcome.method,
                                target = %outcome.target,
                                status = outcome.status,
                                "response write failed"
                            );
                            self.close().await;
                            ConnectionState::Closed
                        }
                    }
                }

                ConnectionState::Written(outcome) => {
                    info!(
                        method = outcome.method,
                        target = %outcome.target,
                        status = outcome.status,
                        "request handled"
                    );
                    self.close().await;
                    ConnectionState::Closed
                }

                ConnectionState::Failed(err) => {
                    warn!(error = %err, "exchange failed");

                    if let Err(e) = self.stream.get_mut().write_all(SERVER_ERROR_RESPONSE).await {
                        debug!(error = %e, "could not deliver error response");
                    }

                    self.close().await;
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.get_mut().shutdown().await {
            debug!(error = %e, "shutdown failed");
        }
    }
}
