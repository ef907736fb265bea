//! Connection-scoped error kinds.
//!
//! Every error here ends at most one connection. None of them is allowed to
//! reach the accept loop.

use thiserror::Error;

use crate::http::parser::ParseError;
use crate::http::response::StatusCode;
use crate::http::writer::EncodeError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The peer closed its side before sending anything.
    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("malformed request: {0}")]
    MalformedRequest(#[from] ParseError),

    #[error("no route for {method} {path}")]
    NoRouteMatch { method: String, path: String },

    #[error("handler failed: {0}")]
    HandlerFailure(String),

    #[error("failed to encode response: {0}")]
    EncodingFailure(#[from] EncodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Status to answer with, or `None` when nothing should be written.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ServerError::ConnectionClosed | ServerError::Io(_) => None,
            ServerError::MalformedRequest(_) => Some(StatusCode::BadRequest),
            ServerError::NoRouteMatch { .. } => Some(StatusCode::NotFound),
            ServerError::HandlerFailure(_) | ServerError::EncodingFailure(_) => {
                Some(StatusCode::InternalServerError)
            }
        }
    }
}
