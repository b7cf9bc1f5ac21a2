//! Wire types for host agent communication
//!
//! Newline-delimited JSON: one `Request` document goes out, one `Response`
//! document comes back. The response `result` is variant-shaped, so it is
//! inspected structurally here and never leaves this module untyped.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Capabilities the host agent understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Ping,
    ListFiles,
    ReadFile,
    WriteFile,
    CreateDir,
    DeleteFile,
    MoveFile,
    CopyFile,
    SystemInfo,
    ListProcesses,
    KillProcess,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Ping => "Ping",
            ActionKind::ListFiles => "ListFiles",
            ActionKind::ReadFile => "ReadFile",
            ActionKind::WriteFile => "WriteFile",
            ActionKind::CreateDir => "CreateDir",
            ActionKind::DeleteFile => "DeleteFile",
            ActionKind::MoveFile => "MoveFile",
            ActionKind::CopyFile => "CopyFile",
            ActionKind::SystemInfo => "SystemInfo",
            ActionKind::ListProcesses => "ListProcesses",
            ActionKind::KillProcess => "KillProcess",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation request with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl Action {
    /// Create an action with no parameters
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            params: Map::new(),
        }
    }

    /// Add a parameter, failing if the value has no JSON representation
    pub fn with_param(mut self, key: impl Into<String>, value: impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(value).map_err(Error::Encode)?;
        self.params.insert(key.into(), value);
        Ok(self)
    }
}

/// A request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub action: Action,
}

impl Request {
    pub fn new(id: impl Into<String>, action: Action) -> Self {
        Self {
            id: id.into(),
            action,
        }
    }

    /// Serialize to a single compact line, newline included
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(self).map_err(Error::Encode)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Correlation id source, `req-<unix seconds>-<counter>`
///
/// The counter belongs to one client (and its clones), not to the process.
#[derive(Debug, Default)]
pub struct RequestIds {
    counter: AtomicU64,
}

impl RequestIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("req-{}-{}", chrono::Utc::now().timestamp(), n)
    }
}

/// A decoded response envelope
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Echoed correlation id, if the agent sent a string one
    pub id: Option<String>,
    pub result: ResponseResult,
}

impl Response {
    /// Parse one response line
    pub fn decode(line: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(line.trim_end()).map_err(|e| Error::decode("response", e))?;
        let Value::Object(mut envelope) = value else {
            return Err(Error::decode(
                "response",
                serde::de::Error::custom("envelope is not a JSON object"),
            ));
        };

        let id = match envelope.remove("id") {
            Some(Value::String(id)) => Some(id),
            _ => None,
        };
        let result = envelope.remove("result").unwrap_or(Value::Null);

        Ok(Self {
            id,
            result: ResponseResult::from_value(result),
        })
    }
}

/// The two shapes a `result` can take
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseResult {
    Error { message: String, code: Option<i64> },
    Success(Payload),
}

impl ResponseResult {
    /// Classify an untyped `result` document.
    ///
    /// A non-null `error` key makes it an error; anything else is a success,
    /// with a missing `type` or `data` read as empty.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return ResponseResult::Success(Payload::default());
        };

        match map.remove("error") {
            Some(Value::Null) | None => {}
            Some(error) => {
                let message = match error {
                    Value::String(message) => message,
                    other => other.to_string(),
                };
                let code = map.get("code").and_then(Value::as_i64);
                return ResponseResult::Error { message, code };
            }
        }

        let kind = match map.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => String::new(),
        };
        let data = match map.remove("data") {
            Some(Value::Object(data)) => data,
            _ => Map::new(),
        };

        ResponseResult::Success(Payload { kind, data })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResponseResult::Error { .. })
    }

    /// The success payload, or the agent's error as `Error::Remote`
    pub fn into_payload(self) -> Result<Payload> {
        match self {
            ResponseResult::Error { message, code } => Err(Error::Remote { message, code }),
            ResponseResult::Success(payload) => Ok(payload),
        }
    }
}

/// Body of a successful result: a `type` discriminator and a `data` object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub kind: String,
    pub data: Map<String, Value>,
}

impl Payload {
    pub fn expect_kind(&self, expected: &str) -> Result<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(Error::ProtocolMismatch {
                expected: expected.to_string(),
                actual: self.kind.clone(),
            })
        }
    }

    /// Take a required field out of `data` and deserialize it
    pub fn take<T: DeserializeOwned>(&mut self, field: &str) -> Result<T> {
        match self.data.remove(field) {
            None | Some(Value::Null) => Err(Error::MissingField(format!("data.{field}"))),
            Some(value) => {
                serde_json::from_value(value).map_err(|e| Error::decode(format!("data.{field}"), e))
            }
        }
    }

    /// An optional unsigned number, `None` if absent or not numeric
    pub fn number(&self, field: &str) -> Option<u64> {
        let value = self.data.get(field)?;
        value
            .as_u64()
            .or_else(|| value.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
    }

    /// Deserialize the whole `data` object
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        if self.data.is_empty() {
            return Err(Error::MissingField("data".to_string()));
        }
        serde_json::from_value(Value::Object(self.data)).map_err(|e| Error::decode("data", e))
    }
}
