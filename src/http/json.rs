//! Flat JSON object decoding.
//!
//! Only objects whose values are strings, booleans or numbers are understood.
//! Nested objects and arrays are not supported: they are not rejected, they
//! just come out as meaningless raw-token fields.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// A single value of a flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

pub type JsonFields = BTreeMap<String, JsonValue>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonError {
    #[error("body is not a JSON object")]
    NotAnObject,
    #[error("unterminated string literal")]
    UnterminatedString,
}

impl From<&str> for JsonValue {
    fn from(s: &str) -> Self {
        JsonValue::String(s.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(s: String) -> Self {
        JsonValue::String(s)
    }
}

impl From<bool> for JsonValue {
    fn from(b: bool) -> Self {
        JsonValue::Bool(b)
    }
}

impl From<i64> for JsonValue {
    fn from(n: i64) -> Self {
        JsonValue::Int(n)
    }
}

impl From<f64> for JsonValue {
    fn from(n: f64) -> Self {
        JsonValue::Float(n)
    }
}

/// Decodes a flat JSON object into its fields.
///
/// Segments without a `:` are skipped. On duplicate keys the last one wins.
pub fn parse_flat_object(body: &str) -> Result<JsonFields, JsonError> {
    let body = body.trim();
    let inner = body
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or(JsonError::NotAnObject)?;

    let mut fields = JsonFields::new();
    for segment in split_outside_strings(inner, ',')? {
        let Some((key, value)) = split_pair(segment)? else {
            continue;
        };
        fields.insert(parse_key(key), parse_value(value));
    }
    Ok(fields)
}

/// Splits on `sep` wherever it is not inside a string literal.
fn split_outside_strings(input: &str, sep: char) -> Result<Vec<&str>, JsonError> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if c == '"' {
            in_string = true;
        } else if c == sep {
            segments.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }

    if in_string {
        return Err(JsonError::UnterminatedString);
    }
    segments.push(&input[start..]);
    Ok(segments
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect())
}

/// Splits a `key:value` segment on its first colon outside a string.
fn split_pair(segment: &str) -> Result<Option<(&str, &str)>, JsonError> {
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in segment.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ':' {
            return Ok(Some((&segment[..i], &segment[i + 1..])));
        }
    }

    if in_string {
        return Err(JsonError::UnterminatedString);
    }
    Ok(None)
}

fn parse_key(raw: &str) -> String {
    let raw = raw.trim();
    match quoted_inner(raw) {
        Some(inner) => unescape(inner),
        None => raw.replace('"', ""),
    }
}

fn parse_value(raw: &str) -> JsonValue {
    let raw = raw.trim();
    if let Some(inner) = quoted_inner(raw) {
        return JsonValue::String(unescape(inner));
    }
    match raw {
        "true" => return JsonValue::Bool(true),
        "false" => return JsonValue::Bool(false),
        _ => {}
    }
    if is_numeric(raw) {
        let parsed = if raw.contains('.') {
            raw.parse::<f64>().ok().map(JsonValue::Float)
        } else {
            raw.parse::<i64>().ok().map(JsonValue::Int)
        };
        if let Some(value) = parsed {
            return value;
        }
    }
    JsonValue::String(raw.to_string())
}

fn quoted_inner(raw: &str) -> Option<&str> {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

/// `-?digits(.digits)?`
fn is_numeric(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int_part) && frac_part.is_none_or(all_digits)
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => out.push(unescape_unicode(&mut chars)),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn unescape_unicode(chars: &mut std::str::Chars<'_>) -> char {
    let Some(high) = read_hex4(chars) else {
        return char::REPLACEMENT_CHARACTER;
    };
    if !(0xD800..0xDC00).contains(&high) {
        return char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER);
    }

    // Surrogate pair: expect `\uDC00..\uDFFF` right after.
    let mut lookahead = chars.clone();
    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
        if let Some(low) = read_hex4(&mut lookahead) {
            if (0xDC00..0xE000).contains(&low) {
                *chars = lookahead;
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
            }
        }
    }
    char::REPLACEMENT_CHARACTER
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok()
}
