//! `multipart/form-data` decoding.
//!
//! Parts are located by splitting the body on `--<boundary>`. Each part's
//! content starts after its first blank line. The body is handled as bytes so
//! uploaded files come through untouched.

use thiserror::Error;

use crate::http::request::FormData;

const DISPOSITION: &[u8] = b"Content-Disposition";
const BLANK_LINE: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultipartError {
    #[error("part has no blank line between its headers and content")]
    MissingContent,
    #[error("Content-Disposition has no name attribute")]
    MissingName,
}

/// Finds the boundary token for a multipart body.
///
/// The `boundary=` parameter of `Content-Type` wins. A separate `Boundary`
/// header is accepted as a fallback for older clients.
pub fn resolve_boundary(content_type: &str, boundary_header: Option<&str>) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| unquote(value.trim()).to_string())
        .or_else(|| boundary_header.map(|b| b.trim().to_string()))
        .filter(|b| !b.is_empty())
}

pub fn parse_multipart(body: &[u8], boundary: &str) -> Result<FormData, MultipartError> {
    let delimiter = [&b"--"[..], boundary.as_bytes()].concat();
    let mut form = FormData::default();

    for part in split_bytes(body, &delimiter) {
        if find(part, DISPOSITION).is_none() {
            continue;
        }

        let part = part.strip_prefix(b"\r\n").unwrap_or(part);
        let split_at = find(part, BLANK_LINE).ok_or(MultipartError::MissingContent)?;
        let head = String::from_utf8_lossy(&part[..split_at]);
        let content = &part[split_at + BLANK_LINE.len()..];

        let disposition = head
            .split("\r\n")
            .find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim()
                    .eq_ignore_ascii_case("Content-Disposition")
                    .then_some(value)
            })
            .ok_or(MultipartError::MissingName)?;

        let name = disposition_param(disposition, "name").ok_or(MultipartError::MissingName)?;

        match disposition_param(disposition, "filename") {
            Some(filename) => {
                let content = content.strip_suffix(b"\r\n").unwrap_or(content);
                form.files.insert(filename.to_string(), content.to_vec());
            }
            None => {
                let value = String::from_utf8_lossy(content).trim().to_string();
                form.fields.insert(name.to_string(), value);
            }
        }
    }

    Ok(form)
}

/// Reads `key="value"` out of a `form-data; name="a"; filename="b"` line.
fn disposition_param<'a>(disposition: &'a str, key: &str) -> Option<&'a str> {
    disposition
        .split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| unquote(v.trim()))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn split_bytes<'a>(mut input: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    let mut parts = Vec::new();
    while let Some(at) = find(input, delimiter) {
        parts.push(&input[..at]);
        input = &input[at + delimiter.len()..];
    }
    parts.push(input);
    parts
}
