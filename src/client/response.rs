use serde::de::DeserializeOwned;

use crate::Error;
use crate::Result;

pub(crate) const STATUS_OK: u16 = 200;
pub(crate) const STATUS_NOT_FOUND: u16 = 404;
pub(crate) const STATUS_CONFLICT: u16 = 409;

/// Metadata every mapper can rely on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseMeta {
    pub status: u16,
    /// Version index from the `X-Consul-Index` header, 0 when absent
    pub index: u64,
}

/// A response whose status was accepted by the operation
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub meta: ResponseMeta,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn index(&self) -> u64 {
        self.meta.index
    }

    /// Parses the body as JSON. Failures are [`Error::Decode`].
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Body as trimmed UTF-8 text
    pub fn text(&self) -> Result<String> {
        std::str::from_utf8(&self.body)
            .map(|s| s.trim().to_string())
            .map_err(|e| Error::Decode(format!("body is not UTF-8: {e}")))
    }
}

/// Outcome of classifying a received response
#[derive(Debug)]
pub(crate) enum Classified {
    /// Status allowed, body goes to the operation's mapper
    Body(RawResponse),
    /// 404 on an operation that treats absence as an empty result
    Empty(ResponseMeta),
}

/// Decides what a received response means for an operation.
///
/// - 404 with `empty_on_not_found` yields [`Classified::Empty`]
/// - a status in `allowed` yields [`Classified::Body`]
/// - anything else is a protocol error carrying status line and body
///
/// Never retries.
pub(crate) fn classify(
    status: u16,
    reason: &str,
    index: u64,
    body: Vec<u8>,
    allowed: &[u16],
    empty_on_not_found: bool,
) -> Result<Classified> {
    let meta = ResponseMeta { status, index };
    if status == STATUS_NOT_FOUND && empty_on_not_found {
        return Ok(Classified::Empty(meta));
    }
    if allowed.contains(&status) {
        return Ok(Classified::Body(RawResponse { meta, body }));
    }
    Err(Error::protocol(status, reason, &body))
}

/// Reads the version index header. Missing or non-numeric values count
/// as 0; not every endpoint returns an index.
pub(crate) fn parse_index(header: Option<&str>) -> u64 {
    header.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(0)
}
