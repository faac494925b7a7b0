use bytes::BytesMut;
use thiserror::Error;
use tokio::io::AsyncBufRead;

use crate::http::headers::HeaderSet;
use crate::http::reader::{read_byte, read_exact, read_until};
use crate::http::request::{Method, Request};

/// Upper bound on the status line plus header section.
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Upper bound on a declared request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Malformed or truncated request framing. None of these are recoverable
/// within the exchange.
#[derive(Debug, Error)]
pub enum FramingError {
    #[error("unsupported method {0:?}")]
    UnsupportedMethod(String),
    #[error("carriage return not followed by line feed")]
    MissingLineFeed,
    #[error("stream ended before the request head was complete")]
    EndOfStream,
    #[error("invalid Content-Length {0:?}")]
    InvalidContentLength(String),
    #[error("body ended after {received} of {expected} bytes")]
    ShortBody { expected: usize, received: usize },
    #[error("request head exceeds {max} bytes", max = MAX_HEAD_BYTES)]
    HeadTooLarge,
    #[error("declared body of {0} bytes exceeds {max} bytes", max = MAX_BODY_BYTES)]
    BodyTooLarge(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reads one request off `reader`.
///
/// Framing is read strictly in order: method and target are each terminated
/// by a single space, the version by a line feed, each header line by
/// `\r\n`, and the header section by an empty line. If a `Content-Length`
/// was declared, exactly that many body bytes follow.
pub async fn parse_request<R>(reader: &mut R) -> Result<Request, FramingError>
where
    R: AsyncBufRead + Unpin,
{
    let mut arena = BytesMut::with_capacity(1024);

    let method = read_token(reader, b' ', &mut arena).await?;
    let target = read_token(reader, b' ', &mut arena).await?;
    let mut version = read_token(reader, b'\n', &mut arena).await?;

    let method = Method::from_bytes(&arena[method.clone()]).ok_or_else(|| {
        FramingError::UnsupportedMethod(String::from_utf8_lossy(&arena[method]).into_owned())
    })?;

    if arena[version.clone()].ends_with(b"\r") {
        version.end -= 1;
    }

    let mut lines = Vec::new();
    loop {
        let line = read_token(reader, b'\r', &mut arena).await?;

        if read_byte(reader).await? != Some(b'\n') {
            return Err(FramingError::MissingLineFeed);
        }

        if line.is_empty() {
            break;
        }

        lines.push(line);
    }

    let head = arena.split().freeze();

    let mut headers = HeaderSet::new();
    for line in lines {
        headers.record(head.slice(line))?;
    }

    let body = match headers.content_length() {
        Some(len) if len > MAX_BODY_BYTES => return Err(FramingError::BodyTooLarge(len)),
        Some(len) => {
            read_exact(reader, len, &mut arena).await?;
            Some(arena.split().freeze())
        }
        None => None,
    };

    Ok(Request::from_parts(
        method,
        head.slice(target),
        head.slice(version),
        headers,
        body,
    ))
}

async fn read_token<R>(
    reader: &mut R,
    delim: u8,
    arena: &mut BytesMut,
) -> Result<std::ops::Range<usize>, FramingError>
where
    R: AsyncBufRead + Unpin,
{
    read_until(reader, delim, arena, MAX_HEAD_BYTES)
        .await?
        .ok_or(FramingError::EndOfStream)
}
