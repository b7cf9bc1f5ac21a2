use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use files::{ClientConfig, DEFAULT_SOCKET_PATH};

const APP_NAME: &str = "webdesk";

/// Environment variable naming the agent socket
pub const SOCKET_ENV: &str = "WEBDESK_SOCKET";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub socket_path: Option<PathBuf>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub verify_response_ids: bool,
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            verify_response_ids: false,
        }
    }
}

impl AgentConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            verify_response_ids: self.verify_response_ids,
        }
    }
}

pub fn get_config_dir() -> Result<PathBuf> {
    // WEBDESK_CONFIG_PATH overrides the default config directory
    if let Ok(path) = std::env::var("WEBDESK_CONFIG_PATH") {
        return Ok(PathBuf::from(path));
    }

    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .context("Could not determine config directory")
}

pub fn get_config_file() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Flag, then environment, then config file, then the well-known path
pub fn resolve_socket_path(
    flag: Option<PathBuf>,
    env: Option<OsString>,
    config: &Config,
) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(path) = &config.agent.socket_path {
        return path.clone();
    }
    PathBuf::from(DEFAULT_SOCKET_PATH)
}

pub fn get_socket_path(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    resolve_socket_path(flag, std::env::var_os(SOCKET_ENV), config)
}

pub fn load_config() -> Result<Config> {
    let config_file = get_config_file()?;

    if !config_file.exists() {
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed to read config file: {}", config_file.display()))?;

    parse_config(&contents)
        .with_context(|| format!("Failed to parse config file: {}", config_file.display()))
}

fn parse_config(contents: &str) -> Result<Config> {
    Ok(toml::from_str(contents)?)
}

pub fn save_config(config: &Config) -> Result<()> {
    let config_file = get_config_file()?;
    let config_dir = get_config_dir()?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    }

    let contents = toml::to_string_pretty(config)?;
    fs::write(&config_file, contents)
        .with_context(|| format!("Failed to write config file: {}", config_file.display()))?;

    Ok(())
}

pub fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "agent.socket_path" => config.agent.socket_path.as_ref().map(|p| p.display().to_string()),
        "agent.connect_timeout_secs" => Some(config.agent.connect_timeout_secs.to_string()),
        "agent.request_timeout_secs" => Some(config.agent.request_timeout_secs.to_string()),
        "agent.verify_response_ids" => Some(config.agent.verify_response_ids.to_string()),
        _ => None,
    }
}

pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "agent.socket_path" => config.agent.socket_path = Some(PathBuf::from(value)),
        "agent.connect_timeout_secs" => {
            config.agent.connect_timeout_secs = value
                .parse()
                .with_context(|| format!("Invalid number of seconds: {}", value))?
        }
        "agent.request_timeout_secs" => {
            config.agent.request_timeout_secs = value
                .parse()
                .with_context(|| format!("Invalid number of seconds: {}", value))?
        }
        "agent.verify_response_ids" => {
            config.agent.verify_response_ids = value
                .parse()
                .with_context(|| format!("Expected true or false, got: {}", value))?
        }
        _ => anyhow::bail!("Unknown config key: {}", key),
    }
    Ok(())
}
