//! Records returned by the host agent

use serde::{Deserialize, Serialize};

/// One directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// File name without its directory
    pub name: String,
    /// Absolute path
    pub path: String,
    #[serde(rename = "is_dir")]
    pub is_directory: bool,
    /// Size in bytes; only meaningful for files
    pub size: u64,
    /// Modification time in Unix seconds
    pub modified: i64,
    pub permissions: String,
}

/// Contents of a file read through the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub content: String,
    /// Size reported by the agent, or the byte length of `content`
    pub size: u64,
}

/// Host summary as reported by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// CPU usage in percent
    pub cpu: f64,
    /// Memory usage in percent
    pub memory: f64,
    /// Disk usage in percent
    pub disk: f64,
    /// Uptime in seconds
    pub uptime: u64,
    pub hostname: String,
    /// Number of running processes
    pub processes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu: f32,
    /// Resident memory in bytes
    pub memory: u64,
    pub status: String,
}
