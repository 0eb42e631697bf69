use std::{fmt::Display, future::Future, io, sync::Arc, time::Duration};

use parser::Request;
use smol::{
    Timer,
    future::FutureExt,
    io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader},
};
use tracing::{debug, info, warn};

use crate::{error::ConnectionError, response::Response, service::HttpService, status::StatusCode};

const CONTENT_LENGTH_PREFIX: &[u8] = b"Content-Length:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingRequestLine,
    ReadingHeaders,
    ReadingBody,
    Dispatching,
    WritingResponse,
    Closed,
}

/// Serves requests on one connection until the peer closes it, a read
/// times out, or an I/O error occurs. Requests are handled strictly one
/// after another.
pub struct ConnectionHandler<IO> {
    service: Arc<HttpService>,
    stream: BufReader<IO>,
    peer: String,
    state: ConnectionState,
}

impl<IO> ConnectionHandler<IO>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(service: Arc<HttpService>, stream: IO, peer: impl Display) -> Self {
        Self {
            service,
            stream: BufReader::new(stream),
            peer: peer.to_string(),
            state: ConnectionState::AwaitingRequestLine,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub async fn run(mut self) -> ConnectionState {
        loop {
            match self.read_request().await {
                Ok(Some(raw)) => {
                    let response = self.dispatch(raw).await;
                    if let Err(e) = self.write_response(&response).await {
                        warn!("{}: failed to write response: {}", self.peer, e);
                        break;
                    }
                }
                Ok(None) => {
                    debug!("{}: peer closed the connection", self.peer);
                    break;
                }
                Err(e) => {
                    self.fail(e).await;
                    break;
                }
            }
        }

        self.close().await;
        self.state
    }

    /// Reads one request: head lines up to the blank line, then the body if
    /// a `Content-Length` line was seen. Empty lines ahead of the request
    /// line are skipped. `None` when the peer closed the stream before a
    /// complete head arrived.
    async fn read_request(&mut self) -> Result<Option<Vec<u8>>, ConnectionError> {
        self.state = ConnectionState::AwaitingRequestLine;

        let mut buffer = Vec::new();
        let mut content_length = None;

        loop {
            let mut line = Vec::new();
            let read = with_deadline(
                self.service.read_timeout,
                self.stream.read_until(b'\n', &mut line),
            )
            .await?;
            if read == 0 {
                if !buffer.is_empty() {
                    debug!("{}: stream ended inside the request head", self.peer);
                }
                return Ok(None);
            }

            let line = trim_line_ending(&line);
            if line.is_empty() {
                if buffer.is_empty() {
                    debug!("{}: skipping empty line before the request line", self.peer);
                    continue;
                }
                break;
            }

            self.state = ConnectionState::ReadingHeaders;
            if let Some(value) = line.strip_prefix(CONTENT_LENGTH_PREFIX) {
                content_length = Some(parse_content_length(value)?);
            }
            buffer.extend_from_slice(line);
            buffer.extend_from_slice(b"\r\n");
        }
        buffer.extend_from_slice(b"\r\n");

        if let Some(length) = content_length {
            self.state = ConnectionState::ReadingBody;
            let mut body = Vec::new();
            let read = with_deadline(
                self.service.body_timeout,
                (&mut self.stream).take(length as u64).read_to_end(&mut body),
            )
            .await?;
            if read < length {
                debug!("{}: body has {} of {} bytes", self.peer, read, length);
                return Err(ConnectionError::TruncatedBody);
            }
            buffer.extend_from_slice(&body);
        }

        Ok(Some(buffer))
    }

    async fn dispatch(&mut self, raw: Vec<u8>) -> Response {
        self.state = ConnectionState::Dispatching;

        let request = self.service.parse(&raw);
        let service = Arc::clone(&self.service);
        let response = smol::unblock(move || service.respond(Some(&request))).await;

        info!("{}: {} bytes -> {}", self.peer, raw.len(), response.status());
        response
    }

    /// Answers a failed read where possible. Write errors here are only
    /// logged; the connection is closing anyway.
    async fn fail(&mut self, error: ConnectionError) {
        let response = match &error {
            ConnectionError::TimedOut => {
                info!("{}: read timed out", self.peer);
                self.service.respond(Some(&Request::TimedOut))
            }
            ConnectionError::TruncatedBody | ConnectionError::InvalidContentLength(_) => {
                info!("{}: {}", self.peer, error);
                Response::new(StatusCode::BadRequest)
            }
            ConnectionError::Io(e) => {
                warn!("{}: read failed: {}", self.peer, e);
                self.service.respond(None)
            }
        };

        if let Err(e) = self.write_response(&response).await {
            warn!("{}: failed to report {}: {}", self.peer, response.status(), e);
        }
    }

    async fn write_response(&mut self, response: &Response) -> Result<(), ConnectionError> {
        self.state = ConnectionState::WritingResponse;

        let bytes = response.to_bytes();
        let stream = self.stream.get_mut();
        with_deadline(self.service.write_timeout, async {
            stream.write_all(&bytes).await?;
            stream.flush().await
        })
        .await
    }

    async fn close(&mut self) {
        self.state = ConnectionState::Closed;
        if let Err(e) = self.stream.get_mut().close().await {
            debug!("{}: error while closing: {}", self.peer, e);
        }
        info!("{}: connection closed", self.peer);
    }
}

pub async fn handle_connection<IO>(
    service: Arc<HttpService>,
    stream: IO,
    peer: impl Display,
) -> ConnectionState
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    ConnectionHandler::new(service, stream, peer).run().await
}

/// Races `io` against a timer armed now.
async fn with_deadline<T>(
    deadline: Duration,
    io: impl Future<Output = io::Result<T>>,
) -> Result<T, ConnectionError> {
    let io = async { io.await.map_err(ConnectionError::from) };
    let timer = async {
        Timer::after(deadline).await;
        Err(ConnectionError::TimedOut)
    };
    io.or(timer).await
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn parse_content_length(value: &[u8]) -> Result<usize, ConnectionError> {
    let value = String::from_utf8_lossy(value);
    value
        .trim()
        .parse()
        .map_err(|_| ConnectionError::InvalidContentLength(value.trim().to_string()))
}
