mod config;
mod output;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use files::HostClient;

#[derive(Parser)]
#[command(name = "webdesk")]
#[command(about = "Manage files on the host through the webdesk host agent")]
#[command(version)]
struct Cli {
    /// Path to the host agent socket
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the host agent answers
    Ping,
    /// List a directory
    Ls {
        #[arg(default_value = "/home")]
        path: String,
    },
    /// Print a file's contents
    Cat { path: String },
    /// Write a file (reads stdin when CONTENT is omitted)
    Write {
        path: String,
        content: Option<String>,
    },
    /// Create a directory
    Mkdir { path: String },
    /// Delete a file or directory
    Rm { path: String },
    /// Move or rename a file
    Mv { from: String, to: String },
    /// Copy a file
    Cp { from: String, to: String },
    /// Show host summary
    Sysinfo,
    /// List processes
    Ps,
    /// Terminate a process
    Kill { pid: u32 },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Show configuration file path
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { action } = cli.command {
        return handle_config(action);
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Default to WARN level for quiet CLI output
    // Use RUST_LOG=debug or RUST_LOG=trace to see the wire traffic
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cfg = config::load_config()?;
    let socket_path = config::get_socket_path(cli.socket, &cfg);
    tracing::debug!("Using host agent socket {}", socket_path.display());

    let client = HostClient::with_config(&socket_path, cfg.agent.client_config());
    let json = cli.json;

    match cli.command {
        Commands::Ping => {
            client.ping().await?;
            done(json, "pong")
        }
        Commands::Ls { path } => {
            let files = client.list_files(&path).await?;
            if json {
                print_json(&files)
            } else {
                print!("{}", output::format_listing(&files));
                Ok(())
            }
        }
        Commands::Cat { path } => {
            let file = client.read_file(&path).await?;
            if json {
                print_json(&file)
            } else {
                print!("{}", file.content);
                Ok(())
            }
        }
        Commands::Write { path, content } => {
            let content = match content {
                Some(content) => content,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read content from stdin")?;
                    buf
                }
            };
            client.write_file(&path, &content).await?;
            done(json, &format!("Wrote {}", path))
        }
        Commands::Mkdir { path } => {
            client.create_dir(&path).await?;
            done(json, &format!("Created {}", path))
        }
        Commands::Rm { path } => {
            client.delete_file(&path).await?;
            done(json, &format!("Deleted {}", path))
        }
        Commands::Mv { from, to } => {
            client.move_file(&from, &to).await?;
            done(json, &format!("Moved {} -> {}", from, to))
        }
        Commands::Cp { from, to } => {
            client.copy_file(&from, &to).await?;
            done(json, &format!("Copied {} -> {}", from, to))
        }
        Commands::Sysinfo => {
            let info = client.system_info().await?;
            if json {
                print_json(&info)
            } else {
                print!("{}", output::format_system_info(&info));
                Ok(())
            }
        }
        Commands::Ps => {
            let processes = client.list_processes().await?;
            if json {
                print_json(&processes)
            } else {
                print!("{}", output::format_processes(&processes));
                Ok(())
            }
        }
        Commands::Kill { pid } => {
            client.kill_process(pid).await?;
            done(json, &format!("Killed {}", pid))
        }
        Commands::Config { action } => handle_config(action),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn done(json: bool, message: &str) -> Result<()> {
    if json {
        print_json(&serde_json::json!({"success": true, "message": message}))
    } else {
        println!("{}", message);
        Ok(())
    }
}

fn handle_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let cfg = config::load_config()?;
            let toml_str = toml::to_string_pretty(&cfg)?;
            println!("{}", toml_str);
            Ok(())
        }
        ConfigAction::Get { key } => {
            let cfg = config::load_config()?;
            match config::get_config_value(&cfg, &key) {
                Some(value) => println!("{}", value),
                None if key == "agent.socket_path" => println!("(not set)"),
                None => anyhow::bail!("Unknown config key: {}", key),
            }
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut cfg = config::load_config()?;
            config::set_config_value(&mut cfg, &key, &value)?;
            config::save_config(&cfg)?;
            println!("Set {} = {}", key, value);
            Ok(())
        }
        ConfigAction::Path => {
            let path = config::get_config_file()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
