use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

use pixelart::{AppConfig, PngCompression};
use pixelart_server::{router, AppState};

#[derive(Parser, Debug)]
#[command(
    name = "pixelart-server",
    about = "Upload an image, get it back as blocky pixel art",
    version
)]
struct Cli {
    /// JSON config file. Defaults to ~/.config/pixelart/config.json if present
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// address to listen on, e.g. 0.0.0.0:8080
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// where uploaded originals are stored
    #[arg(long, value_name = "DIR")]
    upload_dir: Option<PathBuf>,

    /// where pixelated PNGs are stored
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// PNG compression level: fast, default or best
    #[arg(long, value_name = "LEVEL")]
    png_compression: Option<PngCompression>,
}

impl Cli {
    /// Command line flags win over the config file.
    fn into_config(self) -> Result<AppConfig> {
        let mut config = AppConfig::load_or_default(self.config.as_deref())
            .context("Failed to load configuration")?;

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(dir) = self.upload_dir {
            config.upload_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(compression) = self.png_compression {
            config.png_compression = compression;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let config = Cli::parse().into_config()?;
    info!("Starting with config: {config:?}");

    let state = AppState::new(config);
    state
        .storage
        .ensure_dirs()
        .context("Failed to create storage directories")?;
    info!(
        "Uploads in {}, outputs in {}",
        state.storage.upload_dir().display(),
        state.storage.output_dir().display()
    );

    let bind = state.config.bind;
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("Listening on http://{bind}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shut down");
    Ok(())
}

fn setup_logging() -> Result<()> {
    // the library logs through `log`; forward those records into tracing
    tracing_log::LogTracer::init().context("Failed to install log bridge")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter);

    tracing::subscriber::set_global_default(subscriber).context("Failed to install subscriber")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
