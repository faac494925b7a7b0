use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::encoding::negotiate;
use crate::http::headers::HeaderSet;
use crate::http::response::Response;

/// Fixed reply written when an exchange fails before its response went out.
pub const SERVER_ERROR_RESPONSE: &[u8] = b"HTTP/1.1 500 Internal Server Error\r\n\r\n";

/// Serializes `resp` to wire bytes, compressing the body if the request
/// offered a supported encoding.
///
/// An offer with no supported encoding falls back to the identity body.
/// Codec failures are returned.
pub fn serialize_response(
    mut resp: Response,
    request_headers: Option<&HeaderSet>,
) -> std::io::Result<Bytes> {
    let offered = request_headers.and_then(HeaderSet::accept_encoding);

    let encoding = match offered {
        Some(offered) if resp.body.is_some() => match negotiate(offered) {
            Ok(encoding) => Some(encoding),
            Err(mismatch) => {
                tracing::debug!(%mismatch, "sending identity body");
                None
            }
        },
        _ => None,
    };

    if let Some(encoding) = encoding {
        let identity = resp.body.take().unwrap_or_default();
        resp.body = Some(Bytes::from(encoding.encode(&identity)?));
        resp.headers.push("Content-Encoding", encoding.token());
    }

    if let Some(body) = &resp.body {
        resp.headers.push("Content-Length", &body.len().to_string());
    }

    let body_len = resp.body.as_ref().map_or(0, Bytes::len);
    let mut buf = BytesMut::with_capacity(128 + body_len);

    // Status line
    buf.put_slice(
        format!(
            "{} {} {}\r\n",
            resp.version,
            resp.status.as_u16(),
            resp.status.reason_phrase()
        )
        .as_bytes(),
    );

    // Headers
    for (i, line) in resp.headers.lines().iter().enumerate() {
        if i > 0 {
            buf.put_slice(b"\r\n");
        }
        buf.put_slice(line);
    }

    if resp.headers.is_empty() {
        buf.put_slice(b"\r\n");
    } else {
        buf.put_slice(b"\r\n\r\n");
    }

    // Body
    if let Some(body) = &resp.body {
        buf.put_slice(body);
    }

    Ok(buf.freeze())
}

pub struct ResponseWriter {
    buffer: Bytes,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: Response, request_headers: Option<&HeaderSet>) -> std::io::Result<Self> {
        Ok(Self {
            buffer: serialize_response(response, request_headers)?,
            written: 0,
        })
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
