//! `Range` header parsing and response selection.

use thiserror::Error;

/// Bounds of a `Range: bytes=<start>-<end>` header, as written by the client.
///
/// Only a single range is supported; both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    /// First byte, `None` when omitted (treated as 0).
    pub start: Option<u64>,
    /// Last byte, `None` when omitted (treated as the last byte of the file).
    pub end: Option<u64>,
}

impl RangeSpec {
    /// Parse a header value; `None` means the header is unusable and the
    /// whole file should be sent.
    ///
    /// Rejected: other units, multiple ranges, non-numeric bounds and `bytes=-`.
    /// An inverted range (`start > end`) parses; [`plan`] decides what it means.
    pub fn parse(value: &str) -> Option<Self> {
        let spec = value.trim().strip_prefix("bytes=")?;
        if spec.contains(',') {
            return None;
        }

        let (start, end) = spec.split_once('-')?;
        let start = parse_bound(start)?;
        let end = parse_bound(end)?;

        if start.is_none() && end.is_none() {
            return None;
        }
        Some(Self { start, end })
    }
}

/// `Some(None)` for an empty bound, `None` for garbage.
fn parse_bound(s: &str) -> Option<Option<u64>> {
    let s = s.trim();
    if s.is_empty() {
        return Some(None);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().map(Some)
}

/// What to send for a stream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// 200 with the whole file.
    Full {
        /// File size in bytes.
        size: u64,
    },
    /// 206 with bytes `start..=end`.
    Partial {
        /// First byte sent.
        start: u64,
        /// Last byte sent (inclusive).
        end: u64,
        /// File size in bytes.
        size: u64,
    },
}

impl Delivery {
    /// Offset of the first byte of the body.
    pub fn offset(&self) -> u64 {
        match self {
            Delivery::Full { .. } => 0,
            Delivery::Partial { start, .. } => *start,
        }
    }

    /// Number of body bytes (the Content-Length).
    pub fn length(&self) -> u64 {
        match self {
            Delivery::Full { size } => *size,
            Delivery::Partial { start, end, .. } => end - start + 1,
        }
    }

    /// Whether this is a 206 response.
    pub fn is_partial(&self) -> bool {
        matches!(self, Delivery::Partial { .. })
    }

    /// Content-Range header value for partial responses.
    pub fn content_range(&self) -> Option<String> {
        match self {
            Delivery::Full { .. } => None,
            Delivery::Partial { start, end, size } => Some(format!("bytes {start}-{end}/{size}")),
        }
    }
}

/// A parseable range that lies entirely past the end of the file.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("range not satisfiable for a file of {size} bytes")]
    Unsatisfiable { size: u64 },
}

impl RangeError {
    /// Content-Range header value for the 416 response.
    pub fn content_range(&self) -> String {
        match self {
            RangeError::Unsatisfiable { size } => format!("bytes */{size}"),
        }
    }
}

/// Choose the response for a file of `size` bytes given the raw `Range` header.
///
/// A missing start is 0, a missing end is the last byte, and an end past the
/// file is clamped to the last byte. A start at or past the end of the file
/// is unsatisfiable, checked before anything else; an inverted range inside
/// the file is ignored and the whole file is sent.
pub fn plan(range_header: Option<&str>, size: u64) -> Result<Delivery, RangeError> {
    let Some(spec) = range_header.and_then(RangeSpec::parse) else {
        return Ok(Delivery::Full { size });
    };

    let start = spec.start.unwrap_or(0);
    if start >= size {
        return Err(RangeError::Unsatisfiable { size });
    }
    if spec.end.is_some_and(|end| end < start) {
        return Ok(Delivery::Full { size });
    }
    let last = size - 1;
    let end = spec.end.map_or(last, |end| end.min(last));

    Ok(Delivery::Partial { start, end, size })
}
