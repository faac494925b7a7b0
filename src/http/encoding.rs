//! Response body content-encoding negotiation.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use thiserror::Error;

/// Body encodings the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
}

impl ContentEncoding {
    /// Token used in `Accept-Encoding` and `Content-Encoding`.
    pub fn token(&self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
        }
    }

    pub fn encode(&self, body: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            ContentEncoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(body)?;
                encoder.finish()
            }
        }
    }
}

/// None of the client's offered encodings is supported.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no supported encoding among {offered:?}")]
pub struct EncodingMismatch {
    pub offered: Vec<String>,
}

/// Picks the first supported encoding from the client's offered tokens.
/// Tokens must match exactly.
pub fn negotiate(offered: &[String]) -> Result<ContentEncoding, EncodingMismatch> {
    const SUPPORTED: [ContentEncoding; 1] = [ContentEncoding::Gzip];

    offered
        .iter()
        .find_map(|token| SUPPORTED.iter().copied().find(|e| e.token() == token.as_str()))
        .ok_or_else(|| EncodingMismatch {
            offered: offered.to_vec(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn picks_gzip_among_unknown_tokens() {
        let offered = tokens(&["invalid-1", "gzip", "invalid-2"]);
        assert_eq!(negotiate(&offered), Ok(ContentEncoding::Gzip));
    }

    #[test]
    fn mismatch_lists_offered_tokens() {
        let offered = tokens(&["br", "deflate"]);
        let err = negotiate(&offered).unwrap_err();
        assert_eq!(err.offered, offered);
    }

    #[test]
    fn token_match_is_exact() {
        assert!(negotiate(&tokens(&["GZIP", "x-gzip"])).is_err());
        assert!(negotiate(&[]).is_err());
    }

    #[test]
    fn gzip_output_decodes() {
        let encoded = ContentEncoding::Gzip.encode(b"hello").unwrap();

        let mut decoded = String::new();
        flate2::read::GzDecoder::new(&encoded[..])
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "hello");
    }
}
