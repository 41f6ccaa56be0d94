//! TS-CLI: Tri-Shard operator CLI
//!
//! Runs one command against a coordinator and prints the result.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use node_runtime::NodeConfig;
use shared_wire::{remove_succeeded, UPLOAD_SUCCESSFUL};
use ts_04_client_session::ClientSession;
use ts_telemetry::{init_tracing, TelemetryConfig};

/// Hosts a coordinator may bind that are not connectable as-is.
const WILDCARD_HOSTS: [&str; 2] = ["0.0.0.0", "::"];

/// TS-CLI: Tri-Shard operator CLI
#[derive(Parser, Debug)]
#[command(name = "ts-cli")]
#[command(about = "Upload, download, list and remove files on a Tri-Shard coordinator")]
struct Args {
    /// Node config file; the coordinator address is taken from [server]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Coordinator host
    #[arg(long)]
    host: Option<String>,

    /// Coordinator port
    #[arg(short, long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a local file under its base name
    Upload { path: PathBuf },
    /// Download a file into DEST
    Download { name: String, dest: PathBuf },
    /// List the shards held by every store
    Ls,
    /// Remove a file from all stores
    Remove { name: String },
}

impl Args {
    fn coordinator_addr(&self) -> Result<String> {
        let server = NodeConfig::load(self.config.as_deref())
            .context("Failed to load configuration")?
            .server;

        let host = match &self.host {
            Some(host) => host.clone(),
            None if WILDCARD_HOSTS.contains(&server.host.as_str()) => "127.0.0.1".to_string(),
            None => server.host,
        };
        Ok(format!("{}:{}", host, self.port.unwrap_or(server.port)))
    }
}

fn upload_ok(status: &str) -> bool {
    status == UPLOAD_SUCCESSFUL
}

fn remove_ok(name: &str, status: &str) -> bool {
    status == remove_succeeded(name)
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::for_subsystem("04", "client-session");
    if std::env::var("TS_LOG_LEVEL").is_err() && std::env::var("RUST_LOG").is_err() {
        telemetry.log_level = "warn".to_string();
    }
    init_tracing(&telemetry).context("Failed to initialize logging")?;

    let addr = args.coordinator_addr()?;
    let mut session = ClientSession::connect(addr.as_str())
        .await
        .with_context(|| format!("Cannot reach coordinator at {}", addr))?;

    let code = match &args.command {
        Command::Upload { path } => {
            let status = session.upload_file(path).await?;
            println!("{}", status);
            exit_code(upload_ok(&status))
        }
        Command::Download { name, dest } => match session.download_to(name, dest).await? {
            Some(bytes) => {
                println!("Downloaded {} ({} bytes) to {}", name, bytes, dest.display());
                ExitCode::SUCCESS
            }
            None => {
                println!("File not found: {}", name);
                ExitCode::FAILURE
            }
        },
        Command::Ls => {
            for line in session.list().await? {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Command::Remove { name } => {
            let status = session.remove(name).await?;
            println!("{}", status);
            exit_code(remove_ok(name, &status))
        }
    };

    session.exit().await?;
    Ok(code)
}
