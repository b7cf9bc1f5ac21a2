//! One connection per call, bounded by a connect timeout and an exchange
//! deadline fixed at connect time.

use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::trace;

use crate::error::{Error, Result};

/// A connected socket for a single request/response exchange.
///
/// Dropping it closes the socket, so every exit path releases it.
pub(crate) struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    deadline: Instant,
    budget: Duration,
}

impl Connection {
    /// Dial the socket and start the exchange deadline
    pub(crate) async fn open(
        socket_path: &Path,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let stream = match timeout(connect_timeout, UnixStream::connect(socket_path)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(Error::Connect {
                    path: socket_path.to_path_buf(),
                    source,
                })
            }
            Err(_) => {
                return Err(Error::Connect {
                    path: socket_path.to_path_buf(),
                    source: Error::timed_out(format!(
                        "connect timed out after {}ms",
                        connect_timeout.as_millis()
                    )),
                })
            }
        };

        let deadline = Instant::now() + request_timeout;
        let (reader, writer) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(reader),
            writer,
            deadline,
            budget: request_timeout,
        })
    }

    /// Write one request line and read one response line before the deadline
    pub(crate) async fn exchange(&mut self, request: &[u8]) -> Result<String> {
        let deadline = self.deadline;
        let budget = self.budget;

        match timeout_at(deadline, self.round_trip(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Transport(Error::timed_out(format!(
                "no response from host agent within {}ms",
                budget.as_millis()
            )))),
        }
    }

    async fn round_trip(&mut self, request: &[u8]) -> Result<String> {
        self.writer
            .write_all(request)
            .await
            .map_err(Error::Transport)?;
        self.writer.flush().await.map_err(Error::Transport)?;

        trace!("Request sent, waiting for response");

        let mut line = Vec::new();
        self.reader
            .read_until(b'\n', &mut line)
            .await
            .map_err(Error::Transport)?;

        if line.last() != Some(&b'\n') {
            return Err(Error::Transport(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before a complete response line",
            )));
        }

        String::from_utf8(line).map_err(|e| {
            Error::decode(
                "response",
                serde::de::Error::custom(format!("invalid UTF-8: {e}")),
            )
        })
    }
}
