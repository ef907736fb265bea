use std::collections::BTreeMap;
use std::fmt::Write as _;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::json::{JsonFields, JsonValue};
use crate::http::response::{Payload, Response};

const HTTP_VERSION: &str = "HTTP/1.1";

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("JSON field `{0}` is not a finite number")]
    NonFiniteNumber(String),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializes a response into its wire form.
///
/// Only `Content-Type` and `Content-Length` are emitted; the length is the
/// byte length of the encoded body.
pub fn encode_response(resp: &Response) -> Result<Vec<u8>, EncodeError> {
    let (content_type, body) = match &resp.payload {
        Payload::Json(fields) => ("application/json", encode_json(fields)?),
        Payload::Text(text) => ("text/plain", text.clone()),
        Payload::Multipart { form, files } => ("text/plain", encode_multipart_echo(form, files)),
    };

    let mut buf = Vec::with_capacity(128 + body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    buf.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
    buf.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(body.as_bytes());

    Ok(buf)
}

/// `{"k":v,...}`, or `{}` for an empty map.
pub fn encode_json(fields: &JsonFields) -> Result<String, EncodeError> {
    if let Some((key, _)) = fields
        .iter()
        .find(|(_, v)| matches!(v, JsonValue::Float(f) if !f.is_finite()))
    {
        return Err(EncodeError::NonFiniteNumber(key.clone()));
    }
    Ok(serde_json::to_string(fields)?)
}

/// Human-readable summary of received form data. Not multipart-encoded.
pub fn encode_multipart_echo(
    form: &BTreeMap<String, String>,
    files: &BTreeMap<String, Vec<u8>>,
) -> String {
    let mut body = String::from("Received form data: ");
    for (key, value) in form {
        let _ = write!(body, "{key}= {value}");
    }
    for (name, content) in files {
        let _ = write!(
            body,
            "\nReceived file: {name}, Content: {}",
            String::from_utf8_lossy(content)
        );
    }
    body
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Result<Self, EncodeError> {
        Ok(Self {
            buffer: encode_response(response)?,
            written: 0,
        })
    }

    /// Bytes already handed to the socket.
    pub fn written(&self) -> usize {
        self.written
    }

    pub async fn write_to_stream(&mut self, stream: &mut TcpStream) -> anyhow::Result<()> {
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
