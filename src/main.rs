//! commentarium binary entry point.
//!
//! Loads configuration, builds the forge backend, and runs the HTTP
//! server until shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commentarium::core::config::Settings;
use commentarium::forge::create_forge;
use commentarium::server::{serve, AppState};

/// Commentarium - publishes reader comments into a Git-hosted site
#[derive(Parser, Debug)]
#[command(name = "commentarium")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Bind address, overriding the configured one
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` takes precedence; the configured `log_level` is the
/// fallback filter.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = Settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    let settings = loaded.settings;

    init_tracing(&settings.log_level);
    tracing::info!(path = %loaded.path.display(), "configuration loaded");

    let forge = create_forge(&settings).context("failed to build forge backend")?;

    let bind_addr = cli.bind.as_deref().unwrap_or(&settings.bind_addr);
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, forge = forge.name(), "commentarium listening");

    let state = AppState {
        settings: Arc::new(settings),
        forge: Arc::from(forge),
    };
    serve(listener, state).await.context("server failed")?;

    Ok(())
}
