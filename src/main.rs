use clap::Parser;
use radmon_agent::config::{Config, ConfigLoader, LogFormat};
use radmon_agent::rest_api::resolve_bind_addr;
use radmon_agent::{
    build_router, AppResult, PollSupervisor, ReadingStore, RestContext, SerialPortOpener,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Polls a GQ GMC radiation counter over serial and serves the latest CPM as JSON.",
    long_about = "Polls a GQ GMC radiation counter with <GETCPM>> every few seconds, reconnecting on its own after unplug/replug, and serves the latest reading with host temperatures on a local HTTP endpoint."
)]
struct Args {
    /// Fixed serial device path. Disables discovery.
    port: Option<String>,

    /// Path to a configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address for the HTTP server.
    #[arg(long)]
    host: Option<String>,

    /// Port for the HTTP server.
    #[arg(short = 'p', long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = Args::parse();

    let loader = match args.config {
        Some(ref path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    let mut config = loader.config;
    if let Some(port) = args.port {
        config.serial.port = Some(port);
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(http_port) = args.http_port {
        config.server.port = http_port;
    }

    init_tracing(&config);
    if let Some(path) = loader.config_path {
        info!(path = %path.display(), "Configuration loaded");
    }

    let store = ReadingStore::new();
    let cancel = CancellationToken::new();

    let supervisor = PollSupervisor::new(
        config.serial.port_source(),
        Arc::new(SerialPortOpener),
        store.clone(),
        config.poll_settings(),
    );
    let poller = supervisor.spawn(cancel.child_token());

    let app = build_router(RestContext {
        store,
        thermal: config.thermal.probe(),
    });

    let addr = resolve_bind_addr(&config.server.host, config.server.port).await?;
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP started on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cancel.cancel();
    if let Err(e) = poller.await {
        tracing::error!(error = %e, "Poll supervisor task failed");
    }

    served?;
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Signal received, starting graceful shutdown");
}
