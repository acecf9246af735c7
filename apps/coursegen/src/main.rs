mod cli;
mod config;
mod errors;
mod evaluation;
mod generation;
mod llm_client;
mod pipeline;
mod routes;
mod state;
mod syllabus;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let command_line = Cli::parse();

    // Load configuration first; a missing API key is not an error
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize LLM client; its token gate is shared by every call site
    let llm = LlmClient::from_config(&config).context("Failed to build the Gemini client")?;
    if !config.has_api_key() {
        warn!("No API key configured (API_KEY / GEMINI_API_KEY); running in demo mode");
    } else {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    }
    info!(
        "Token gate: {} tokens per minute, {}s back-off",
        llm.gate().capacity(),
        config.rate_limit_backoff.as_secs()
    );

    match command_line.command {
        Commands::Generate(args) => cli::generate(args, &llm, &config.content_language).await,
        Commands::Serve { port } => serve(llm, &config, port.unwrap_or(config.port)).await,
    }
}

async fn serve(llm: LlmClient, config: &Config, port: u16) -> Result<()> {
    info!("Starting coursegen API v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::new(llm, config);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
