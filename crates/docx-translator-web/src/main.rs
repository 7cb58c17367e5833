//! DOCX Translator Web - Web server for converting and translating PDF documents.

mod helpers;
mod routes;
mod state;
mod templates;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, header};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use clap::Parser;
use docx_translator_core::{AppConfig, TranslatorBackend};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use state::AppState;

/// Largest accepted request body
pub const MAX_UPLOAD_BYTES: usize = 300 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "docx-translator-web")]
#[command(author, version, about = "PDF to DOCX converter web server", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Config file path
    #[arg(short, long, env = "DOCX_TRANSLATOR_CONFIG")]
    config: Option<PathBuf>,

    /// OpenAI API base URL (used with the openai backend)
    #[arg(long, env = "OPENAI_API_BASE")]
    api_base: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    api_key: Option<String>,

    /// Model name for OpenAI-compatible API
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            AppConfig::load_layered(Some(path.as_path())).context("Failed to load config file")?
        }
        None => AppConfig::load(),
    };

    if config.translator.backend == TranslatorBackend::OpenAi {
        if let Some(api_base) = &args.api_base {
            config.translator.api_base = Some(api_base.clone());
        }
        if let Some(api_key) = &args.api_key {
            config.translator.api_key = Some(api_key.clone());
        }
        if let Some(model) = &args.model {
            config.translator.model.clone_from(model);
        }
    }

    Ok(config)
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        // API endpoints
        .route("/api/convert", post(routes::convert))
        .route("/api/languages", get(routes::languages))
        // Middleware
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        ))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let config = load_config(&args)?;
    info!(
        "Translator backend: {:?}, converter: {}, renderer: {}",
        config.translator.backend,
        config.converter.program.display(),
        config.renderer.program.display()
    );

    let state = Arc::new(
        AppState::new(config).context("Failed to initialize application state")?,
    );

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
