//! Resource handlers.
//!
//! Structural problems with a request (wrong segment count, missing header,
//! unknown file) are answered with a status code. Only storage failures
//! are returned as errors.

use thiserror::Error;

use crate::http::request::Request;
use crate::http::response::Response;
use crate::storage::{FileStore, StorageError};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// `GET /echo/<text>`: returns `<text>` verbatim.
pub fn echo(request: &Request) -> Response {
    match request.segments() {
        [_, text] => Response::text(text.clone()),
        _ => Response::unprocessable(),
    }
}

/// `GET /user-agent`: reflects the client's `User-Agent` header.
pub fn user_agent(request: &Request) -> Response {
    if request.segments().len() != 1 {
        return Response::unprocessable();
    }

    match request.headers().value_of("User-Agent") {
        Some(agent) => Response::text(bytes::Bytes::copy_from_slice(agent)),
        None => Response::bad_request(),
    }
}

/// `GET /files/<name>`
pub async fn read_file(store: &FileStore, request: &Request) -> Result<Response, HandlerError> {
    let [_, name] = request.segments() else {
        return Ok(Response::unprocessable());
    };

    match store.read(name).await {
        Ok(contents) => Ok(Response::octet_stream(contents)),
        Err(StorageError::NotFound | StorageError::InvalidName(_)) => Ok(Response::not_found()),
        Err(e) => Err(e.into()),
    }
}

/// `POST /files/<name>`: creates or overwrites the file with the request
/// body. A request without a body leaves an empty file.
pub async fn write_file(store: &FileStore, request: &Request) -> Result<Response, HandlerError> {
    let [_, name] = request.segments() else {
        return Ok(Response::unprocessable());
    };

    let contents = request.body().map_or(&[][..], |b| &b[..]);

    match store.write(name, contents).await {
        Ok(()) => Ok(Response::created()),
        Err(StorageError::InvalidName(_)) => Ok(Response::not_found()),
        Err(e) => Err(e.into()),
    }
}
