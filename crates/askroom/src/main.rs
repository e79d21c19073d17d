//! # askroom
//!
//! Server binary: wires the store and server crates together and runs until
//! interrupted.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use askroom_server::{AskroomServer, ServerConfig, metrics};
use askroom_store::{ConnectionConfig, new_file, run_migrations};

/// Live Q&A rooms with real-time fan-out.
#[derive(Parser, Debug)]
#[command(name = "askroom", about = "askroom server")]
struct Cli {
    /// Host to bind.
    #[arg(long, env = "ASKROOM_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, env = "ASKROOM_PORT", default_value = "8080")]
    port: u16,

    /// Path to the `SQLite` database.
    #[arg(long, env = "ASKROOM_DB_PATH")]
    db_path: Option<PathBuf>,
}

impl Cli {
    fn default_db_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".askroom").join("askroom.db")
    }
}

fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let metrics_handle = metrics::install_recorder();

    let db_path = cli.db_path.unwrap_or_else(Cli::default_db_path);
    ensure_parent_dir(&db_path)?;
    let db_path_str = db_path
        .to_str()
        .with_context(|| format!("Non-UTF-8 database path: {}", db_path.display()))?;

    let pool = new_file(db_path_str, &ConnectionConfig::default())
        .with_context(|| format!("Failed to open database: {db_path_str}"))?;
    {
        let conn = pool.get().context("Failed to check out a connection")?;
        let _ = run_migrations(&conn).context("Failed to run migrations")?;
    }
    info!(db_path = db_path_str, "database ready");

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        ..ServerConfig::default()
    };
    let server = Arc::new(AskroomServer::new(config, pool, Some(metrics_handle)));
    let (addr, handle) = server.listen().await.context("Failed to bind")?;
    info!(%addr, "askroom listening");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    info!("shutting down");
    server.shutdown().graceful_shutdown(vec![handle], None).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["askroom"]);
        assert_eq!(cli.host, "0.0.0.0");
        assert_eq!(cli.port, 8080);
        assert!(cli.db_path.is_none());
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::parse_from([
            "askroom",
            "--host",
            "127.0.0.1",
            "--port",
            "0",
            "--db-path",
            "/tmp/test.db",
        ]);
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 0);
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/test.db")));
    }

    #[test]
    fn cli_flags_are_env_overridable() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let env_of = |id: &str| {
            cmd.get_arguments()
                .find(|a| a.get_id() == id)
                .unwrap()
                .get_env()
                .unwrap()
                .to_str()
                .unwrap()
                .to_owned()
        };
        assert_eq!(env_of("host"), "ASKROOM_HOST");
        assert_eq!(env_of("port"), "ASKROOM_PORT");
        assert_eq!(env_of("db_path"), "ASKROOM_DB_PATH");
    }

    #[test]
    fn default_db_path_is_under_home() {
        let path = Cli::default_db_path();
        assert!(path.ends_with(".askroom/askroom.db"));
    }

    #[test]
    fn ensure_parent_dir_creates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("askroom.db");
        ensure_parent_dir(&nested).unwrap();
        assert!(nested.parent().unwrap().is_dir());
    }
}
