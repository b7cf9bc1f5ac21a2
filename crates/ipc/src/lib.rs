//! Wire protocol and client for the webdesk host agent
//!
//! This crate handles the low-level exchange with the privileged host agent
//! over a Unix socket. It knows the closed set of action kinds and the shape
//! of the response envelope, but nothing about what a file listing means.
//!
//! # Architecture
//!
//! ```text
//! files::HostClient               IPC Crate
//! ┌─────────────────────────┐    ┌─────────────────────┐
//! │  list_files / read_file  │───>│  Client             │
//! │  (typed wrapper)         │    │  Request / Response │
//! └─────────────────────────┘    └──────────┬──────────┘
//!                                           │  one connection per call
//!                                           v
//!                                    Unix Socket
//!                                           │
//!                                           v
//!                                    ┌──────────────┐
//!                                    │  Host agent  │
//!                                    └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use ipc::{Action, ActionKind, Client};
//!
//! let client = Client::new("/var/run/webdesk.sock");
//! let action = Action::new(ActionKind::ListFiles).with_param("path", "/home")?;
//! let mut payload = client.call(action).await?;
//! let files: serde_json::Value = payload.take("files")?;
//! ```

mod client;
mod error;
mod protocol;
mod transport;

pub use client::{Client, ClientConfig, DEFAULT_SOCKET_PATH};
pub use error::{Error, Result};
pub use protocol::{Action, ActionKind, Payload, Request, RequestIds, Response, ResponseResult};
