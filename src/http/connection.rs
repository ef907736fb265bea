use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use crate::error::ServerError;
use crate::http::parser::{FrameState, ParseError, decode_request, frame_request};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::router::Router;

/// Read sizing for a single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLimits {
    /// Bytes requested from the socket per read
    pub read_chunk_size: usize,
    /// Largest request (head and body) accepted before answering 400
    pub max_request_bytes: usize,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self {
            read_chunk_size: 1024,
            max_request_bytes: 1024 * 1024,
        }
    }
}

pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    buffer: BytesMut,
    frame: FrameState,
    state: ConnectionState,
    router: Arc<Router>,
    limits: ConnectionLimits,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        router: Arc<Router>,
        limits: ConnectionLimits,
    ) -> Self {
        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(limits.read_chunk_size),
            frame: FrameState::ReadingHeaders,
            state: ConnectionState::Reading,
            router,
            limits,
        }
    }

    /// Serves exactly one request, then closes the socket.
    ///
    /// The socket is shut down on every path out of here, including errors.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let result = self.drive().await;
        self.state = ConnectionState::Closed;

        if let Err(e) = self.stream.shutdown().await {
            debug!(peer = %self.peer, error = %e, "Shutdown after response failed");
        }

        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await {
                    Ok(request) => ConnectionState::Processing(request),
                    Err(ServerError::ConnectionClosed) => {
                        debug!(peer = %self.peer, "Peer closed before sending a request");
                        ConnectionState::Closed
                    }
                    Err(ServerError::Io(e)) => return Err(e.into()),
                    Err(e) => {
                        warn!(peer = %self.peer, error = %e, "Rejecting request");
                        ConnectionState::Writing(self.error_writer(&e)?)
                    }
                },

                ConnectionState::Processing(request) => {
                    let response = match self.router.dispatch(&request) {
                        Ok(response) => response,
                        Err(e @ ServerError::NoRouteMatch { .. }) => {
                            debug!(peer = %self.peer, error = %e, "No route");
                            Response::not_found()
                        }
                        Err(e) => {
                            error!(
                                peer = %self.peer,
                                method = %request.method,
                                path = %request.path,
                                error = %e,
                                "Handler failed"
                            );
                            Response::internal_error()
                        }
                    };

                    info!(
                        peer = %self.peer,
                        method = %request.method,
                        path = %request.path,
                        status = response.status.as_u16(),
                        "Request handled"
                    );

                    let writer = match ResponseWriter::new(&response) {
                        Ok(writer) => writer,
                        Err(e) => {
                            let e = ServerError::from(e);
                            error!(peer = %self.peer, error = %e, "Response encoding failed");
                            self.error_writer(&e)?
                        }
                    };
                    ConnectionState::Writing(writer)
                }

                ConnectionState::Writing(mut writer) => {
                    if let Err(e) = writer.write_to_stream(&mut self.stream).await {
                        // Part of the response may be out already; nothing more is sent.
                        warn!(
                            peer = %self.peer,
                            written = writer.written(),
                            error = %e,
                            "Failed to write response"
                        );
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    /// Reads until the framer reports one complete message, then decodes it.
    pub async fn read_request(&mut self) -> Result<Request, ServerError> {
        let mut chunk = vec![0u8; self.limits.read_chunk_size];

        loop {
            let frame = frame_request(&self.buffer)?;
            if frame != self.frame {
                debug!(peer = %self.peer, state = ?frame, "Framing progress");
                self.frame = frame;
            }

            match frame {
                FrameState::Complete { message_len } => {
                    let message = self.buffer.split_to(message_len);
                    return Ok(decode_request(&message)?);
                }

                FrameState::ReadingBody {
                    received,
                    content_length,
                } if (self.buffer.len() - received)
                    .checked_add(content_length)
                    .is_none_or(|total| total > self.limits.max_request_bytes) =>
                {
                    return Err(self.too_large());
                }

                _ if self.buffer.len() >= self.limits.max_request_bytes => {
                    return Err(self.too_large());
                }

                _ => {}
            }

            let n = self.stream.read(&mut chunk).await?;

            if n == 0 {
                return Err(if self.buffer.is_empty() {
                    ServerError::ConnectionClosed
                } else {
                    ParseError::Truncated.into()
                });
            }

            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }

    fn too_large(&self) -> ServerError {
        ParseError::TooLarge {
            limit: self.limits.max_request_bytes,
        }
        .into()
    }

    fn error_writer(&self, e: &ServerError) -> anyhow::Result<ResponseWriter> {
        let response = e
            .status()
            .map(Response::for_status)
            .unwrap_or_else(Response::internal_error);
        Ok(ResponseWriter::new(&response)?)
    }
}
