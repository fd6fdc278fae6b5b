use clap::Parser;
use color_eyre::Result;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use tailor::server::AppState;
use tailor::{config, server};

/// Personalization service for Markdown blog content
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Personalization service for Markdown blog content using LLM providers"
)]
struct Args {
    /// Listen address (overrides config file and TAILOR_BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Path to a .env file with provider credentials
    #[arg(long, default_value = ".env")]
    dotenv: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    // Load .env before reading configuration so credentials land in the env overlay
    if std::path::Path::new(&args.dotenv).exists() {
        dotenvy::from_path(&args.dotenv)?;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_result = config::load_config();
    if let Some(warning) = &config_result.warning {
        tracing::warn!("{warning}");
    }

    let mut config = config_result.config;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    let bind_addr = config.server.bind_addr.clone();

    let state = AppState::new(config);
    if state.gateway.is_configured() {
        tracing::info!(providers = ?state.gateway.provider_names(), "providers configured");
    } else {
        tracing::warn!("no provider credentials configured; generation requests will fail");
    }

    let app = server::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "starting personalization service");

    axum::serve(listener, app).await?;

    Ok(())
}
