//! Relay - single-process HTTP/1.1 server
//!
//! Decodes one request per connection (flat JSON and multipart bodies
//! included), routes it on exact method and path, and writes the response
//! before closing the connection.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
