//! Linkshelf Server — HTTP API for bookmark categorization.
//!
//! Thin axum server wrapping the linkshelf_lib pipeline. Stateless: every
//! request carries its own bookmark snapshot and scraped metadata.
//!
//! Usage:
//!   LINKSHELF_BIND=0.0.0.0:3741 linkshelf-server
//!
//! Or with args:
//!   linkshelf-server --config /etc/linkshelf.json --bind 0.0.0.0:3741 --taxonomy taxonomy.json

use clap::Parser;
use linkshelf_lib::http_server::{router, AppState};
use linkshelf_lib::settings::Settings;
use linkshelf_lib::Taxonomy;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "linkshelf-server")]
#[command(version, about = "Bookmark categorization HTTP API", long_about = None)]
struct Args {
    /// Settings file (JSON); falls back to $LINKSHELF_CONFIG
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address, e.g. 127.0.0.1:3741
    #[arg(long)]
    bind: Option<String>,

    /// Taxonomy file (JSON); built-in table if omitted
    #[arg(long)]
    taxonomy: Option<PathBuf>,
}

fn load_settings(args: Args) -> linkshelf_lib::Result<Settings> {
    let settings = Settings::load(args.config.as_deref())?.apply_overrides(args.bind, args.taxonomy);
    settings.validate()?;
    Ok(settings)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("[Server] linkshelf-server v{}", env!("CARGO_PKG_VERSION"));

    let settings = match load_settings(Args::parse()) {
        Ok(s) => s,
        Err(e) => {
            error!("[Server] {}", e);
            std::process::exit(1);
        }
    };

    let taxonomy = match Taxonomy::load(settings.taxonomy_path.as_deref()) {
        Ok(t) => t,
        Err(e) => {
            error!("[Server] Failed to load taxonomy: {}", e);
            std::process::exit(1);
        }
    };
    match &settings.taxonomy_path {
        Some(path) => info!("[Server] Taxonomy: {} ({} categories)", path.display(), taxonomy.len()),
        None => info!("[Server] Taxonomy: built-in ({} categories)", taxonomy.len()),
    }

    let app = router(AppState::new(taxonomy), settings.body_limit_bytes);

    let listener = match tokio::net::TcpListener::bind(&settings.bind).await {
        Ok(l) => l,
        Err(e) => {
            error!("[Server] Failed to bind {}: {}", settings.bind, e);
            std::process::exit(1);
        }
    };
    info!("[Server] Listening on http://{}", settings.bind);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("[Server] Server error: {}", e);
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("[Server] Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("[Server] Shutting down");
}
