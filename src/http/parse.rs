//! Parses a complete HTTP/1.1 message out of a byte buffer.
//!
//! Unlike the teacher's original incremental, state-machine parser (built
//! for data arriving across multiple non-blocking reads), this parser
//! assumes the whole message is already in hand — the accept path (§4.6)
//! reads a bounded buffer synchronously before parsing, so there is no
//! partial-message state to track. Ported from the original's
//! `HTTPRequest::_parseMessage`.

use crate::error::RequestParseError;
use crate::http::request::HttpRequest;
use std::collections::HashMap;

const CRLF: &str = "\r\n";
const FIELD_LINE_SEPARATOR: &str = "\r\n\r\n";

/// Parses `message` into a complete `HttpRequest`, assuming it is valid
/// UTF-8 on the start-line and header block (the body is taken verbatim as
/// raw bytes regardless of encoding).
pub fn parse_request(message: &[u8]) -> Result<HttpRequest, RequestParseError> {
    let start_line_end = find_subslice(message, CRLF.as_bytes()).ok_or(RequestParseError::HeadersDoNotExist)?;

    let start_line = std::str::from_utf8(&message[..start_line_end])
        .map_err(|_| RequestParseError::RequestLineError)?;

    let parts: Vec<&str> = start_line.split(' ').collect();
    if parts.len() != 3 {
        return Err(RequestParseError::RequestLineError);
    }

    let headers_start = start_line_end + CRLF.len();
    let field_line_pos = find_subslice(&message[headers_start..], FIELD_LINE_SEPARATOR.as_bytes())
        .map(|p| p + headers_start)
        .ok_or(RequestParseError::MissingFieldLineSeparator)?;

    let header_block = std::str::from_utf8(&message[headers_start..field_line_pos])
        .map_err(|_| RequestParseError::MissingFieldLineSeparator)?;
    let headers = parse_headers(header_block);

    let body_start = field_line_pos + FIELD_LINE_SEPARATOR.len();
    let body = if body_start < message.len() {
        message[body_start..].to_vec()
    } else {
        Vec::new()
    };

    Ok(HttpRequest {
        method: parts[0].to_string(),
        target: parts[1].to_string(),
        version: parts[2].to_string(),
        headers,
        body,
    })
}

/// Splits the header block on CRLF and each line on the first `": "`;
/// duplicate header names are overwritten by the last occurrence, matching
/// the original's direct `map` assignment.
fn parse_headers(block: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    if block.is_empty() {
        return headers;
    }
    for line in block.split(CRLF) {
        if let Some(sep) = line.find(": ") {
            let name = line[..sep].to_string();
            let value = line[sep + 2..].to_string();
            headers.insert(name, value);
        }
    }
    headers
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_get_with_header_and_body() {
        let raw = b"GET /x HTTP/1.1\r\nHost: a\r\n\r\nhello";
        let req = parse_request(raw).unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.target, "/x");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.headers.get("Host"), Some(&"a".to_string()));
        assert_eq!(req.body, b"hello");
    }

    #[test]
    fn malformed_start_line_is_rejected() {
        let raw = b"GET\r\n\r\n";
        assert!(matches!(
            parse_request(raw),
            Err(RequestParseError::RequestLineError)
        ));
    }

    #[test]
    fn missing_crlf_after_start_line_is_rejected() {
        let raw = b"GET /x HTTP/1.1";
        assert!(matches!(
            parse_request(raw),
            Err(RequestParseError::HeadersDoNotExist)
        ));
    }

    #[test]
    fn missing_field_line_separator_is_rejected() {
        let raw = b"GET /x HTTP/1.1\r\nHost: a\r\n";
        assert!(matches!(
            parse_request(raw),
            Err(RequestParseError::MissingFieldLineSeparator)
        ));
    }

    #[test]
    fn duplicate_header_last_value_wins() {
        let raw = b"GET / HTTP/1.1\r\nHost: a\r\nHost: b\r\n\r\n";
        let req = parse_request(raw).unwrap();
        assert_eq!(req.headers.get("Host"), Some(&"b".to_string()));
    }

    #[test]
    fn request_with_no_body_is_empty() {
        let raw = b"GET / HTTP/1.1\r\nHost: a\r\n\r\n";
        let req = parse_request(raw).unwrap();
        assert!(req.body.is_empty());
    }
}
