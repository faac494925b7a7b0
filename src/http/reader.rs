//! Byte-level reads over one connection's buffered stream.
//!
//! Every read appends into a caller-owned arena and returns the range the
//! token occupies, so the parser can later hand out slices of a single
//! frozen buffer instead of owning each field separately.

use std::ops::Range;

use bytes::BytesMut;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::http::parser::FramingError;

/// Reads up to and including `delim`, appending to `arena`.
///
/// Returns the range of the token without its delimiter, or `None` if the
/// stream ended before `delim` was seen. `limit` bounds the total arena size.
pub async fn read_until<R>(
    reader: &mut R,
    delim: u8,
    arena: &mut BytesMut,
    limit: usize,
) -> Result<Option<Range<usize>>, FramingError>
where
    R: AsyncBufRead + Unpin,
{
    let start = arena.len();

    loop {
        let available = reader.fill_buf().await?;

        if available.is_empty() {
            return Ok(None);
        }

        let (taken, done) = match available.iter().position(|b| *b == delim) {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };

        if arena.len() + taken > limit {
            return Err(FramingError::HeadTooLarge);
        }

        arena.extend_from_slice(&available[..taken]);
        reader.consume(taken);

        if done {
            return Ok(Some(start..arena.len() - 1));
        }
    }
}

/// Reads a single byte, `None` at end of stream.
pub async fn read_byte<R>(reader: &mut R) -> Result<Option<u8>, FramingError>
where
    R: AsyncBufRead + Unpin,
{
    let available = reader.fill_buf().await?;

    match available.first().copied() {
        Some(b) => {
            reader.consume(1);
            Ok(Some(b))
        }
        None => Ok(None),
    }
}

/// Reads exactly `len` bytes with no delimiter, appending to `arena`.
pub async fn read_exact<R>(
    reader: &mut R,
    len: usize,
    arena: &mut BytesMut,
) -> Result<Range<usize>, FramingError>
where
    R: AsyncBufRead + Unpin,
{
    let start = arena.len();
    arena.resize(start + len, 0);

    let mut filled = 0;
    while filled < len {
        let n = reader.read(&mut arena[start + filled..]).await?;
        if n == 0 {
            arena.truncate(start + filled);
            return Err(FramingError::ShortBody {
                expected: len,
                received: filled,
            });
        }
        filled += n;
    }

    Ok(start..start + len)
}
