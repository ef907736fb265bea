use std::collections::HashMap;

use thiserror::Error;

use crate::http::json::parse_flat_object;
use crate::http::multipart::{MultipartError, parse_multipart, resolve_boundary};
use crate::http::request::{Body, Method, Request};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid request line")]
    InvalidRequest,
    #[error("request head is not valid UTF-8")]
    InvalidEncoding,
    #[error("invalid Content-Length header")]
    InvalidContentLength,
    #[error("multipart body without a boundary")]
    MissingBoundary,
    #[error("invalid multipart body: {0}")]
    InvalidMultipart(#[from] MultipartError),
    #[error("connection closed before the request was complete")]
    Truncated,
    #[error("request exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// How far along the buffered bytes are towards one complete message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// The blank line ending the headers has not arrived yet.
    ReadingHeaders,
    /// Headers are in, `received` of `content_length` body bytes so far.
    ReadingBody {
        received: usize,
        content_length: usize,
    },
    /// The first `message_len` bytes hold the whole request.
    Complete { message_len: usize },
}

/// Decides whether `buf` holds a complete request yet.
///
/// A request without `Content-Length` has an empty body.
pub fn frame_request(buf: &[u8]) -> Result<FrameState, ParseError> {
    let Some(headers_end) = find_headers_end(buf) else {
        return Ok(FrameState::ReadingHeaders);
    };

    let head = std::str::from_utf8(&buf[..headers_end]).map_err(|_| ParseError::InvalidEncoding)?;
    let content_length = framing_content_length(head)?;
    let body_start = headers_end + HEADER_TERMINATOR.len();
    let received = buf.len() - body_start;

    if received < content_length {
        Ok(FrameState::ReadingBody {
            received,
            content_length,
        })
    } else {
        Ok(FrameState::Complete {
            message_len: body_start + content_length,
        })
    }
}

/// Decodes one complete request message.
///
/// Header lines without `": "` are skipped. Body sub-parsing runs at most
/// once, picked by the `Content-Type` prefix.
pub fn decode_request(message: &[u8]) -> Result<Request, ParseError> {
    let (head_bytes, body_bytes) = match find_headers_end(message) {
        Some(end) => (&message[..end], &message[end + HEADER_TERMINATOR.len()..]),
        None => (message, &[][..]),
    };

    let head = std::str::from_utf8(head_bytes).map_err(|_| ParseError::InvalidEncoding)?;
    framing_content_length(head)?;
    let mut lines = head.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split(' ');

    let method = parts
        .next()
        .filter(|m| !m.is_empty())
        .ok_or(ParseError::InvalidRequest)?;
    let path = parts
        .next()
        .filter(|p| !p.is_empty())
        .ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().unwrap_or("HTTP/1.1");

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(": ") {
            headers.insert(key.to_string(), value.to_string());
        }
    }

    let raw_body = String::from_utf8_lossy(body_bytes).trim().to_string();

    let content_type = headers.get("Content-Type").map(String::as_str).unwrap_or("");
    let body = if content_type.starts_with("multipart/form-data") {
        let boundary = resolve_boundary(content_type, headers.get("Boundary").map(String::as_str))
            .ok_or(ParseError::MissingBoundary)?;
        Body::Multipart(parse_multipart(body_bytes, &boundary)?)
    } else if content_type.starts_with("application/json") {
        let fields = parse_flat_object(&raw_body).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "JSON body ignored");
            Default::default()
        });
        Body::Json(fields)
    } else {
        Body::Opaque
    };

    Ok(Request {
        method: Method::parse(method),
        path: path.to_string(),
        version: version.to_string(),
        headers,
        raw_body,
        body,
    })
}

/// The body length announced by the head.
///
/// Repeated `Content-Length` headers must agree, otherwise the request is
/// rejected rather than framed on one of them.
fn framing_content_length(head: &str) -> Result<usize, ParseError> {
    let mut declared = None;

    for (key, value) in head.split("\r\n").skip(1).filter_map(|line| line.split_once(':')) {
        if !key.trim().eq_ignore_ascii_case("Content-Length") {
            continue;
        }
        let len = value
            .trim()
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidContentLength)?;
        match declared {
            Some(previous) if previous != len => return Err(ParseError::InvalidContentLength),
            _ => declared = Some(len),
        }
    }

    Ok(declared.unwrap_or(0))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        assert_eq!(
            frame_request(req).unwrap(),
            FrameState::Complete {
                message_len: req.len()
            }
        );
        let parsed = decode_request(req).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
    }

    #[test]
    fn framing_ignores_trailing_bytes_past_content_length() {
        let req = b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nhiEXTRA";
        let FrameState::Complete { message_len } = frame_request(req).unwrap() else {
            panic!("expected a complete frame");
        };
        assert_eq!(&req[..message_len], b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi");
    }
}
