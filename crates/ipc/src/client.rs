//! Host agent client
//!
//! Sends one action per connection and hands back the success payload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{Action, Payload, Request, RequestIds, Response};
use crate::transport::Connection;

/// Socket path used when nothing else is configured
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/webdesk.sock";

/// Timeouts and checks applied to every call
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Upper bound on dialing the socket
    pub connect_timeout: Duration,
    /// Upper bound on the whole write/read exchange, counted from connect
    pub request_timeout: Duration,
    /// Reject responses whose echoed id differs from the request's
    pub verify_response_ids: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            verify_response_ids: false,
        }
    }
}

/// Client for the host agent socket
///
/// Opens a fresh connection for each call, so concurrent calls share nothing
/// but the correlation-id counter. Clones share that counter.
#[derive(Debug, Clone)]
pub struct Client {
    socket_path: PathBuf,
    config: ClientConfig,
    ids: Arc<RequestIds>,
}

impl Client {
    /// Create a new client for the given socket path
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self::with_config(socket_path, ClientConfig::default())
    }

    pub fn with_config(socket_path: impl AsRef<Path>, config: ClientConfig) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            config,
            ids: Arc::new(RequestIds::new()),
        }
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Allocate the next correlation id
    pub fn next_request_id(&self) -> String {
        self.ids.next_id()
    }

    /// Send an action and return the success payload.
    ///
    /// An error-shaped result comes back as `Error::Remote`.
    pub async fn call(&self, action: Action) -> Result<Payload> {
        let request = Request::new(self.next_request_id(), action);
        let response = self.send_request(&request).await?;
        self.check_correlation(&request, &response)?;
        response.result.into_payload()
    }

    /// Low-level: send a request and receive a response
    pub async fn send_request(&self, request: &Request) -> Result<Response> {
        let bytes = request.encode()?;

        trace!(
            "Sending: {}",
            String::from_utf8_lossy(&bytes[..bytes.len() - 1])
        );

        let total_start = Instant::now();
        let mut connection = Connection::open(
            &self.socket_path,
            self.config.connect_timeout,
            self.config.request_timeout,
        )
        .await?;
        let connect_elapsed = total_start.elapsed();

        let exchange_start = Instant::now();
        let line = connection.exchange(&bytes).await?;
        let exchange_elapsed = exchange_start.elapsed();
        drop(connection);

        trace!("Received: {}", line.trim_end());

        let response = Response::decode(&line)?;

        debug!(
            action = %request.action.kind,
            id = %request.id,
            total_ms = total_start.elapsed().as_micros() as f64 / 1000.0,
            connect_ms = connect_elapsed.as_micros() as f64 / 1000.0,
            exchange_ms = exchange_elapsed.as_micros() as f64 / 1000.0,
            "Host agent call complete"
        );

        Ok(response)
    }

    fn check_correlation(&self, request: &Request, response: &Response) -> Result<()> {
        let Some(actual) = response.id.as_deref() else {
            return Ok(());
        };
        if actual == request.id {
            return Ok(());
        }

        if self.config.verify_response_ids {
            return Err(Error::CorrelationMismatch {
                expected: request.id.clone(),
                actual: actual.to_string(),
            });
        }

        warn!(
            expected = %request.id,
            actual = %actual,
            "Response id does not match request id"
        );
        Ok(())
    }
}
