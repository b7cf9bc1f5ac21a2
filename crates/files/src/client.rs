//! Typed client for host agent file operations
//!
//! Each method builds one action, sends it over its own connection and turns
//! the payload into a typed value.

use std::path::Path;

use ipc::{Action, ActionKind, Client as IpcClient, ClientConfig, Result};
use tracing::debug;

use crate::types::{FileContent, FileInfo, ProcessInfo, SystemInfo};

/// Client for file operations via the host agent
#[derive(Debug, Clone)]
pub struct HostClient {
    client: IpcClient,
}

impl HostClient {
    /// Create a new client for the given socket path
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self {
            client: IpcClient::new(socket_path),
        }
    }

    pub fn with_config(socket_path: impl AsRef<Path>, config: ClientConfig) -> Self {
        Self {
            client: IpcClient::with_config(socket_path, config),
        }
    }

    /// The underlying protocol client
    pub fn ipc(&self) -> &IpcClient {
        &self.client
    }

    /// Liveness probe: the agent must answer `Pong`
    pub async fn ping(&self) -> Result<()> {
        let payload = self.client.call(Action::new(ActionKind::Ping)).await?;
        payload.expect_kind("Pong")
    }

    /// Check if the agent is reachable and answering pings
    pub async fn health_check(&self) -> Result<bool> {
        match self.ping().await {
            Ok(()) => Ok(true),
            Err(e) => {
                debug!("Health check failed: {}", e);
                Ok(false)
            }
        }
    }

    // ========== File Operations ==========

    /// List a directory, in whatever order the agent returns
    pub async fn list_files(&self, path: &str) -> Result<Vec<FileInfo>> {
        let action = Action::new(ActionKind::ListFiles).with_param("path", path)?;
        let mut payload = self.client.call(action).await?;
        payload.take("files")
    }

    /// Read a file's contents
    pub async fn read_file(&self, path: &str) -> Result<FileContent> {
        let action = Action::new(ActionKind::ReadFile).with_param("path", path)?;
        let mut payload = self.client.call(action).await?;

        let content: String = payload.take("content")?;
        // The agent may omit size for virtual content.
        let size = payload
            .number("size")
            .unwrap_or(content.len() as u64);

        Ok(FileContent { content, size })
    }

    /// Create or overwrite a file
    pub async fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let action = Action::new(ActionKind::WriteFile)
            .with_param("path", path)?
            .with_param("content", content)?;
        self.acknowledge(action).await
    }

    pub async fn create_dir(&self, path: &str) -> Result<()> {
        let action = Action::new(ActionKind::CreateDir).with_param("path", path)?;
        self.acknowledge(action).await
    }

    pub async fn delete_file(&self, path: &str) -> Result<()> {
        let action = Action::new(ActionKind::DeleteFile).with_param("path", path)?;
        self.acknowledge(action).await
    }

    pub async fn move_file(&self, from: &str, to: &str) -> Result<()> {
        let action = Action::new(ActionKind::MoveFile)
            .with_param("from", from)?
            .with_param("to", to)?;
        self.acknowledge(action).await
    }

    pub async fn copy_file(&self, from: &str, to: &str) -> Result<()> {
        let action = Action::new(ActionKind::CopyFile)
            .with_param("from", from)?
            .with_param("to", to)?;
        self.acknowledge(action).await
    }

    // ========== System Operations ==========

    /// Host summary as the agent reports it
    pub async fn system_info(&self) -> Result<SystemInfo> {
        let payload = self.client.call(Action::new(ActionKind::SystemInfo)).await?;
        payload.expect_kind("SystemInfo")?;
        payload.into_data()
    }

    pub async fn list_processes(&self) -> Result<Vec<ProcessInfo>> {
        let mut payload = self
            .client
            .call(Action::new(ActionKind::ListProcesses))
            .await?;
        payload.take("processes")
    }

    pub async fn kill_process(&self, pid: u32) -> Result<()> {
        let action = Action::new(ActionKind::KillProcess).with_param("pid", pid)?;
        self.acknowledge(action).await
    }

    /// Success means the result was not an error; the payload is ignored
    async fn acknowledge(&self, action: Action) -> Result<()> {
        self.client.call(action).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipc::Error;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::UnixListener;
    use tokio::task::JoinHandle;

    const LISTING: &str = r#"{"id":"x","result":{"type":"Files","data":{"files":[{"name":"a.txt","path":"/home/a.txt","is_dir":false,"size":10,"modified":1000,"permissions":"rw-r--r--"}]}}}"#;
    const REMOTE_ERROR: &str = r#"{"id":"x","result":{"error":"permission denied","code":13}}"#;

    /// A one-shot agent answering every connection with `reply`; returns the
    /// request documents it saw.
    struct FakeAgent {
        _dir: TempDir,
        path: PathBuf,
        handle: JoinHandle<Vec<Value>>,
    }

    impl FakeAgent {
        fn start(connections: usize, reply: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("webdesk.sock");
            let listener = UnixListener::bind(&path).unwrap();
            let reply = format!("{reply}\n");

            let handle = tokio::spawn(async move {
                let mut seen: Vec<Value> = Vec::new();
                for _ in 0..connections {
                    let (stream, _) = listener.accept().await.unwrap();
                    let (reader, mut writer) = stream.into_split();
                    let mut line = String::new();
                    BufReader::new(reader).read_line(&mut line).await.unwrap();
                    writer.write_all(reply.as_bytes()).await.unwrap();
                    seen.push(serde_json::from_str(&line).unwrap());
                }
                seen
            });

            Self {
                _dir: dir,
                path,
                handle,
            }
        }

        fn client(&self) -> HostClient {
            HostClient::with_config(
                &self.path,
                ClientConfig {
                    connect_timeout: Duration::from_secs(1),
                    request_timeout: Duration::from_secs(2),
                    verify_response_ids: false,
                },
            )
        }

        async fn requests(self) -> Vec<Value> {
            self.handle.await.unwrap()
        }
    }

    #[tokio::test]
    async fn test_ping_accepts_pong() {
        let agent = FakeAgent::start(1, r#"{"result":{"type":"Pong"}}"#);
        agent.client().ping().await.unwrap();

        let requests = agent.requests().await;
        assert_eq!(requests[0]["action"], json!({"type": "Ping"}));
    }

    #[tokio::test]
    async fn test_ping_rejects_other_type() {
        let agent = FakeAgent::start(1, r#"{"result":{"type":"Pang"}}"#);
        let err = agent.client().ping().await.unwrap_err();
        assert!(matches!(err, Error::ProtocolMismatch { .. }), "{err}");
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_health_check_reports_unreachable_agent() {
        let dir = tempfile::tempdir().unwrap();
        let client = HostClient::new(dir.path().join("absent.sock"));
        assert!(!client.health_check().await.unwrap());

        let agent = FakeAgent::start(1, r#"{"result":{"type":"Pong"}}"#);
        assert!(agent.client().health_check().await.unwrap());
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_list_files_returns_records_verbatim() {
        let agent = FakeAgent::start(1, LISTING);
        let files = agent.client().list_files("/home").await.unwrap();

        assert_eq!(
            files,
            vec![FileInfo {
                name: "a.txt".to_string(),
                path: "/home/a.txt".to_string(),
                is_directory: false,
                size: 10,
                modified: 1000,
                permissions: "rw-r--r--".to_string(),
            }]
        );

        let requests = agent.requests().await;
        assert_eq!(
            requests[0]["action"],
            json!({"type": "ListFiles", "params": {"path": "/home"}})
        );
    }

    #[tokio::test]
    async fn test_list_files_keeps_agent_order() {
        let agent = FakeAgent::start(
            1,
            r#"{"result":{"type":"Files","data":{"files":[
                {"name":"zeta","path":"/z","is_dir":false,"size":1,"modified":0,"permissions":"rw-------"},
                {"name":"alpha","path":"/a","is_dir":true,"size":0,"modified":0,"permissions":"rwx------"}
            ]}}}"#
                .replace('\n', "")
                .as_str(),
        );
        let files = agent.client().list_files("/").await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_list_files_without_files_field() {
        let agent = FakeAgent::start(1, r#"{"id":"x","result":{"type":"Files","data":{}}}"#);
        let err = agent.client().list_files("/home").await.unwrap_err();
        assert!(matches!(err, Error::MissingField(_)), "{err}");
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_list_files_with_malformed_records() {
        let agent = FakeAgent::start(
            1,
            r#"{"id":"x","result":{"type":"Files","data":{"files":[{"name":"a.txt"}]}}}"#,
        );
        let err = agent.client().list_files("/home").await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }), "{err}");
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_read_file_falls_back_to_content_length() {
        let agent = FakeAgent::start(
            1,
            r#"{"id":"x","result":{"type":"FileContent","data":{"content":"hello","size":null}}}"#,
        );
        let file = agent.client().read_file("/home/a.txt").await.unwrap();
        assert_eq!(
            file,
            FileContent {
                content: "hello".to_string(),
                size: 5,
            }
        );
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_read_file_prefers_reported_size() {
        let agent = FakeAgent::start(
            1,
            r#"{"result":{"type":"FileContent","data":{"content":"hello","size":4096}}}"#,
        );
        let file = agent.client().read_file("/proc/virtual").await.unwrap();
        assert_eq!(file.size, 4096);
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_read_file_size_counts_bytes() {
        let agent = FakeAgent::start(
            1,
            r#"{"result":{"type":"FileContent","data":{"content":"héllo"}}}"#,
        );
        let file = agent.client().read_file("/home/utf8.txt").await.unwrap();
        assert_eq!(file.size, 6);
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_read_file_requires_content() {
        let agent = FakeAgent::start(1, r#"{"result":{"type":"FileContent","data":{"size":3}}}"#);
        let err = agent.client().read_file("/home/a.txt").await.unwrap_err();
        assert!(matches!(err, Error::MissingField(_)), "{err}");
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_acknowledged_operations_send_expected_params() {
        let agent = FakeAgent::start(
            6,
            r#"{"result":{"type":"Success","data":{"message":"done"}}}"#,
        );
        let client = agent.client();

        client.write_file("/home/a.txt", "hi").await.unwrap();
        client.create_dir("/home/new").await.unwrap();
        client.delete_file("/home/old").await.unwrap();
        client.move_file("/home/a.txt", "/home/b.txt").await.unwrap();
        client.copy_file("/home/b.txt", "/home/c.txt").await.unwrap();
        client.kill_process(4242).await.unwrap();

        let actions: Vec<Value> = agent
            .requests()
            .await
            .into_iter()
            .map(|r| r["action"].clone())
            .collect();
        assert_eq!(
            actions,
            vec![
                json!({"type": "WriteFile", "params": {"path": "/home/a.txt", "content": "hi"}}),
                json!({"type": "CreateDir", "params": {"path": "/home/new"}}),
                json!({"type": "DeleteFile", "params": {"path": "/home/old"}}),
                json!({"type": "MoveFile", "params": {"from": "/home/a.txt", "to": "/home/b.txt"}}),
                json!({"type": "CopyFile", "params": {"from": "/home/b.txt", "to": "/home/c.txt"}}),
                json!({"type": "KillProcess", "params": {"pid": 4242}}),
            ]
        );
    }

    #[tokio::test]
    async fn test_acknowledge_needs_no_payload() {
        let agent = FakeAgent::start(1, r#"{"id":"x","result":{}}"#);
        agent.client().delete_file("/tmp/x").await.unwrap();
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_every_operation_surfaces_remote_message() {
        let agent = FakeAgent::start(11, REMOTE_ERROR);
        let client = agent.client();

        let results: Vec<Result<()>> = vec![
            client.ping().await,
            client.list_files("/home").await.map(|_| ()),
            client.read_file("/home/a.txt").await.map(|_| ()),
            client.write_file("/home/a.txt", "x").await,
            client.create_dir("/home/d").await,
            client.delete_file("/home/a.txt").await,
            client.move_file("/a", "/b").await,
            client.copy_file("/a", "/b").await,
            client.system_info().await.map(|_| ()),
            client.list_processes().await.map(|_| ()),
            client.kill_process(1).await,
        ];

        for result in results {
            let err = result.unwrap_err();
            assert!(matches!(err, Error::Remote { .. }), "{err}");
            assert_eq!(err.to_string(), "permission denied");
        }
        assert_eq!(agent.requests().await.len(), 11);
    }

    #[tokio::test]
    async fn test_system_info() {
        let agent = FakeAgent::start(
            1,
            r#"{"result":{"type":"SystemInfo","data":{"cpu":12.5,"memory":40.0,"disk":70.1,"uptime":3600,"hostname":"desk","processes":123}}}"#,
        );
        let info = agent.client().system_info().await.unwrap();
        assert_eq!(info.hostname, "desk");
        assert_eq!(info.uptime, 3600);
        assert_eq!(info.processes, 123);
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_system_info_wrong_type() {
        let agent = FakeAgent::start(1, r#"{"result":{"type":"Pong"}}"#);
        let err = agent.client().system_info().await.unwrap_err();
        assert!(matches!(err, Error::ProtocolMismatch { .. }), "{err}");
        agent.requests().await;
    }

    #[tokio::test]
    async fn test_list_processes() {
        let agent = FakeAgent::start(
            1,
            r#"{"result":{"type":"Processes","data":{"processes":[{"pid":1,"name":"init","cpu":0.1,"memory":1024,"status":"running"}]}}}"#,
        );
        let processes = agent.client().list_processes().await.unwrap();
        assert_eq!(processes.len(), 1);
        assert_eq!(processes[0].pid, 1);
        assert_eq!(processes[0].name, "init");
        agent.requests().await;
    }
}
