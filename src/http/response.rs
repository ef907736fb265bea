use std::collections::BTreeMap;

use crate::http::json::JsonFields;

/// HTTP status codes.
///
/// The four codes the server produces itself have variants; handlers may use
/// any other code through `Other`, which is sent with the reason "Unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// Any other numeric code
    Other(u16),
}

impl StatusCode {
    pub fn from_u16(code: u16) -> Self {
        match code {
            200 => StatusCode::Ok,
            400 => StatusCode::BadRequest,
            404 => StatusCode::NotFound,
            500 => StatusCode::InternalServerError,
            other => StatusCode::Other(other),
        }
    }

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use relay::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::Other(201).as_u16(), 201);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::Other(code) => *code,
        }
    }

    /// Returns the reason phrase sent on the status line.
    ///
    /// # Example
    ///
    /// ```
    /// # use relay::http::response::StatusCode;
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// assert_eq!(StatusCode::Other(201).reason_phrase(), "Unknown");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.as_u16() {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

/// The body a handler answers with. Exactly one shape per response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Flat JSON object, sent as `application/json`
    Json(JsonFields),
    /// Plain text, sent as `text/plain`
    Text(String),
    /// Diagnostic summary of received form and file fields, sent as `text/plain`
    Multipart {
        form: BTreeMap<String, String>,
        files: BTreeMap<String, Vec<u8>>,
    },
}

/// A complete HTTP response, written once and followed by connection close.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    pub payload: Payload,
}

impl Response {
    pub fn json(status: StatusCode, fields: JsonFields) -> Self {
        Self {
            status,
            payload: Payload::Json(fields),
        }
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            payload: Payload::Text(body.into()),
        }
    }

    pub fn multipart(
        status: StatusCode,
        form: BTreeMap<String, String>,
        files: BTreeMap<String, Vec<u8>>,
    ) -> Self {
        Self {
            status,
            payload: Payload::Multipart { form, files },
        }
    }

    /// Creates a simple 200 OK text response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::text(StatusCode::Ok, body)
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request() -> Self {
        Self::text(StatusCode::BadRequest, "Bad Request")
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::text(StatusCode::NotFound, "Not Found")
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        Self::text(StatusCode::InternalServerError, "Internal Server Error")
    }

    /// Plain-text response for a status chosen from an error.
    pub fn for_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BadRequest => Self::bad_request(),
            StatusCode::NotFound => Self::not_found(),
            StatusCode::Ok => Self::ok("OK"),
            StatusCode::InternalServerError => Self::internal_error(),
            StatusCode::Other(_) => Self::text(status, status.reason_phrase()),
        }
    }
}
