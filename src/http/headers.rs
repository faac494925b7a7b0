use bytes::Bytes;

use crate::http::parser::FramingError;

const CONTENT_LENGTH: &[u8] = b"Content-Length:";
const ACCEPT_ENCODING: &[u8] = b"Accept-Encoding:";
const VALUE_SEPARATOR: &[u8] = b": ";

/// An ordered list of raw `Name: value` header lines.
///
/// Lines are kept exactly as they appeared on the wire. Two headers are
/// additionally decoded while lines are recorded from a request:
///
/// - `Content-Length`, where a value of `0` is treated the same as a missing
///   header so the request carries no body.
/// - `Accept-Encoding`, split on `,` into trimmed tokens.
///
/// Both matches are case-sensitive prefix matches on the header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    raw: Vec<Bytes>,
    content_length: Option<usize>,
    accept_encoding: Option<Vec<String>>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a header line read from a request, decoding the special-cased
    /// headers.
    pub fn record(&mut self, line: Bytes) -> Result<(), FramingError> {
        if line.starts_with(CONTENT_LENGTH) {
            let value = value_after_separator(&line)
                .ok_or_else(|| FramingError::InvalidContentLength(lossy(&line)))?;

            let length = std::str::from_utf8(value)
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .ok_or_else(|| FramingError::InvalidContentLength(lossy(value)))?;

            self.content_length = (length > 0).then_some(length);
        } else if line.starts_with(ACCEPT_ENCODING) {
            let tokens = value_after_separator(&line)
                .map(|value| {
                    lossy(value)
                        .split(',')
                        .map(|token| token.trim_matches(' ').to_string())
                        .collect()
                })
                .unwrap_or_default();

            self.accept_encoding = Some(tokens);
        }

        self.raw.push(line);
        Ok(())
    }

    /// Appends a `name: value` line without decoding it. Used when building
    /// responses.
    pub fn push(&mut self, name: &str, value: &str) {
        self.raw.push(Bytes::from(format!("{}: {}", name, value)));
    }

    /// Header lines in wire order.
    pub fn lines(&self) -> &[Bytes] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the value of the first line starting with `name: `.
    ///
    /// The match is case-sensitive, and lines are scanned in wire order.
    pub fn value_of(&self, name: &str) -> Option<&[u8]> {
        self.raw.iter().find_map(|line| {
            line.strip_prefix(name.as_bytes())
                .and_then(|rest| rest.strip_prefix(VALUE_SEPARATOR))
        })
    }

    /// Declared body length, absent when the header is missing or `0`.
    pub fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    /// Encoding tokens offered by the client, present only if the header
    /// appeared.
    pub fn accept_encoding(&self) -> Option<&[String]> {
        self.accept_encoding.as_deref()
    }
}

fn value_after_separator(line: &[u8]) -> Option<&[u8]> {
    line.windows(VALUE_SEPARATOR.len())
        .position(|w| w == VALUE_SEPARATOR)
        .map(|i| &line[i + VALUE_SEPARATOR.len()..])
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
