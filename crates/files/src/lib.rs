//! File management through the webdesk host agent
//!
//! `HostClient` wraps the generic `ipc::Client` with one method per agent
//! operation and converts each payload into a typed record.

mod client;
mod types;

pub use client::HostClient;
pub use ipc::{ClientConfig, Error, Result, DEFAULT_SOCKET_PATH};
pub use types::{FileContent, FileInfo, ProcessInfo, SystemInfo};
