use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::routing::handlers::{self, HandlerError};
use crate::storage::FileStore;

/// The resource a request target addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Exactly `/`
    Root,
    /// Prefix `/echo`
    Echo,
    /// Prefix `/user-agent`
    UserAgent,
    /// Prefix `/files`
    Files,
    Unmatched,
}

impl Route {
    /// Classifies a raw target. Prefixes are tested in priority order and
    /// the first match wins.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::routing::Route;
    /// assert_eq!(Route::classify(b"/"), Route::Root);
    /// assert_eq!(Route::classify(b"/echo/abc"), Route::Echo);
    /// assert_eq!(Route::classify(b"/index.html"), Route::Unmatched);
    /// ```
    pub fn classify(target: &[u8]) -> Self {
        if target == b"/" {
            Route::Root
        } else if target.starts_with(b"/echo") {
            Route::Echo
        } else if target.starts_with(b"/user-agent") {
            Route::UserAgent
        } else if target.starts_with(b"/files") {
            Route::Files
        } else {
            Route::Unmatched
        }
    }
}

/// Dispatches classified requests to their handlers.
///
/// A route reached with a method it does not serve answers 404.
#[derive(Debug, Clone)]
pub struct Router {
    store: FileStore,
}

impl Router {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }

    pub async fn handle(&self, route: Route, request: &Request) -> Result<Response, HandlerError> {
        match (route, request.method()) {
            (Route::Root, Method::GET) => Ok(Response::ok()),
            (Route::Echo, Method::GET) => Ok(handlers::echo(request)),
            (Route::UserAgent, Method::GET) => Ok(handlers::user_agent(request)),
            (Route::Files, Method::GET) => handlers::read_file(&self.store, request).await,
            (Route::Files, Method::POST) => handlers::write_file(&self.store, request).await,
            (Route::Root | Route::Echo | Route::UserAgent, Method::POST)
            | (Route::Unmatched, _) => Ok(Response::not_found()),
        }
    }

    /// Classifies and handles `request` in one step.
    pub async fn dispatch(&self, request: &Request) -> Result<Response, HandlerError> {
        self.handle(Route::classify(request.target()), request).await
    }
}
