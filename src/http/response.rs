use bytes::Bytes;

use crate::http::headers::HeaderSet;

pub const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP status codes produced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 422 Unprocessable Content
    UnprocessableContent,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::UnprocessableContent.as_u16(), 422);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::UnprocessableContent => 422,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the reason phrase sent on the status line.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::UnprocessableContent => "Unprocessable Content",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// A response ready to be serialized.
///
/// `Content-Length` is never part of `headers`; the writer derives it from
/// the body at serialization time.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub version: &'static str,
    pub headers: HeaderSet,
    pub body: Option<Bytes>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use courier::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/plain")
///     .body("hello")
///     .build();
/// assert_eq!(response.headers.len(), 1);
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderSet,
    body: Option<Bytes>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderSet::new(),
            body: None,
        }
    }

    /// Appends a header line. `Content-Length` is computed by the writer and
    /// is ignored here.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if name.eq_ignore_ascii_case("Content-Length") {
            tracing::warn!(value, "ignoring caller-supplied Content-Length");
            return self;
        }

        self.headers.push(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn build(self) -> Response {
        Response {
            status: self.status,
            version: HTTP_VERSION,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// 200 with no headers and no body.
    pub fn ok() -> Self {
        ResponseBuilder::new(StatusCode::Ok).build()
    }

    /// 200 `text/plain` response.
    pub fn text(body: impl Into<Bytes>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "text/plain")
            .body(body)
            .build()
    }

    /// 200 `application/octet-stream` response.
    pub fn octet_stream(body: impl Into<Bytes>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "application/octet-stream")
            .body(body)
            .build()
    }

    pub fn created() -> Self {
        ResponseBuilder::new(StatusCode::Created).build()
    }

    pub fn bad_request() -> Self {
        ResponseBuilder::new(StatusCode::BadRequest).build()
    }

    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NotFound).build()
    }

    pub fn unprocessable() -> Self {
        ResponseBuilder::new(StatusCode::UnprocessableContent).build()
    }

    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError).build()
    }
}
