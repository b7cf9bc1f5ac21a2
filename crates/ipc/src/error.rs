//! Error types for host agent calls

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between building an action and getting a
/// typed result back.
#[derive(Error, Debug)]
pub enum Error {
    /// The socket could not be reached (absent, refused, permission denied,
    /// or the connect deadline elapsed).
    #[error("failed to connect to host agent at {}: {source}", .path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// Write or read failed after the connection was established, including
    /// deadline expiry and the agent closing the socket mid-exchange.
    #[error("host agent exchange failed: {0}")]
    Transport(#[source] io::Error),

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response is missing field `{0}`")]
    MissingField(String),

    #[error("unexpected response type: expected `{expected}`, got `{actual}`")]
    ProtocolMismatch { expected: String, actual: String },

    #[error("response id mismatch: expected {expected}, got {actual}")]
    CorrelationMismatch { expected: String, actual: String },

    /// The agent reported a failure. Displays the agent's message verbatim.
    #[error("{message}")]
    Remote { message: String, code: Option<i64> },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn decode(what: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Decode {
            what: what.into(),
            source,
        }
    }

    pub(crate) fn timed_out(message: String) -> io::Error {
        io::Error::new(io::ErrorKind::TimedOut, message)
    }

    /// True when a connect or exchange deadline elapsed
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Connect { source, .. } | Error::Transport(source) => {
                source.kind() == io::ErrorKind::TimedOut
            }
            _ => false,
        }
    }

    /// True when the exchange could not be completed at all
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Connect { .. } | Error::Transport(_))
    }

    /// The agent-supplied message, if the agent reported this error
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Error::Remote { message, .. } => Some(message),
            _ => None,
        }
    }
}
