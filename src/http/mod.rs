//! HTTP protocol implementation.
//!
//! One request per connection: no keep-alive, no pipelining, no chunked
//! transfer-encoding.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection state machine driving read, dispatch and write
//! - **`parser`**: Frames a message out of the read buffer and decodes it
//! - **`json`**: Flat JSON object bodies
//! - **`multipart`**: `multipart/form-data` bodies
//! - **`request`**: HTTP request representation
//! - **`response`**: Status codes and response payloads
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← ReadingHeaders → ReadingBody → Complete
//!        └──────┬──────┘
//!               │ Request decoded (or 400 on a malformed one)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route lookup and handler call
//!        └──────┬───────────┘
//!               │ Response ready (404 / 500 on failure)
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!            Closed
//! ```
//!
//! A peer that closes before sending anything goes straight from `Reading`
//! to `Closed` without a response.

pub mod connection;
pub mod json;
pub mod multipart;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
