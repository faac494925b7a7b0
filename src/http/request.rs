use bytes::Bytes;

use crate::http::headers::HeaderSet;
use crate::http::parser::FramingError;

/// HTTP request methods.
///
/// Only GET and POST are served. Any other token is rejected while parsing
/// rather than represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
}

impl Method {
    /// Parses an HTTP method from its wire token.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::request::Method;
    /// assert_eq!(Method::from_bytes(b"GET"), Some(Method::GET));
    /// assert_eq!(Method::from_bytes(b"get"), None);
    /// assert_eq!(Method::from_bytes(b"PUT"), None);
    /// ```
    pub fn from_bytes(token: &[u8]) -> Option<Self> {
        match token {
            b"GET" => Some(Method::GET),
            b"POST" => Some(Method::POST),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
        }
    }
}

/// A parsed HTTP request.
///
/// Target, version and header lines are slices of one shared buffer read
/// off the connection; the body, if any, is a second buffer. Dropping the
/// request releases both.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    target: Bytes,
    segments: Vec<Bytes>,
    version: Bytes,
    headers: HeaderSet,
    body: Option<Bytes>,
}

impl Request {
    pub(crate) fn from_parts(
        method: Method,
        target: Bytes,
        version: Bytes,
        headers: HeaderSet,
        body: Option<Bytes>,
    ) -> Self {
        let segments = split_segments(&target);

        Self {
            method,
            target,
            segments,
            version,
            headers,
            body,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The raw request target, e.g. `/echo/abc`.
    pub fn target(&self) -> &[u8] {
        &self.target
    }

    /// Non-empty `/`-delimited components of the target, in order.
    pub fn segments(&self) -> &[Bytes] {
        &self.segments
    }

    pub fn version(&self) -> &[u8] {
        &self.version
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Target rendered for logs.
    pub fn target_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.target)
    }
}

fn split_segments(target: &Bytes) -> Vec<Bytes> {
    target
        .split(|b| *b == b'/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| target.slice_ref(segment))
        .collect()
}

/// Builder for constructing Request objects without a wire round trip.
pub struct RequestBuilder {
    method: Method,
    target: Bytes,
    version: Bytes,
    headers: Vec<Bytes>,
    body: Option<Bytes>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            target: Bytes::from_static(b"/"),
            version: Bytes::from_static(b"HTTP/1.1"),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Bytes::from(target.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Bytes::from(version.into());
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push(Bytes::from(format!("{}: {}", name, value)));
        self
    }

    /// Sets the body and declares its length with a `Content-Length` line.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.headers
            .push(Bytes::from(format!("Content-Length: {}", body.len())));
        self.body = (!body.is_empty()).then_some(body);
        self
    }

    /// Builds the request, decoding header lines the way the parser does.
    pub fn build(self) -> Result<Request, FramingError> {
        let mut headers = HeaderSet::new();
        for line in self.headers {
            headers.record(line)?;
        }

        Ok(Request::from_parts(
            self.method,
            self.target,
            self.version,
            headers,
            self.body,
        ))
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
