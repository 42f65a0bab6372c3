//! RAG gateway binary
//!
//! Run with: cargo run -p help-rag --bin help-rag-server

use clap::Parser;
use help_rag::{GatewayConfig, GatewayServer, RagSession};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// HTTP gateway for PDF ingestion, queries and chat over Ollama
#[derive(Debug, Parser)]
#[command(name = "help-rag-server", version, about)]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "help_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => GatewayConfig::from_file(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!(
        "  - LLM model: {} (max tokens {}, temperature {}, stream {})",
        config.llm.model,
        config.llm.max_tokens,
        config.llm.temperature,
        config.llm.stream
    );
    tracing::info!("  - Embedding model: {}", config.embedder.model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);

    let session = RagSession::from_config(&config)?;

    // Check Ollama
    tracing::info!("Checking Ollama at {}...", config.llm.base_url);
    let (embedder_ok, llm_ok, _) = session.health_check().await;
    if embedder_ok && llm_ok {
        tracing::info!("Ollama is running");
    } else {
        tracing::warn!("Ollama not available at {}", config.llm.base_url);
        tracing::warn!("Please start Ollama:");
        tracing::warn!("  1. Start: ollama serve");
        tracing::warn!("  2. Pull models: ollama pull {}", config.llm.model);
    }

    let server = GatewayServer::new(config.server.clone(), Arc::new(session));

    tracing::info!("Endpoints on http://{}:", server.address());
    tracing::info!("  POST /add    - Add a PDF by path");
    tracing::info!("  POST /query  - Ask a one-shot question");
    tracing::info!("  POST /chat   - Continue the chat session");

    server.start().await?;

    Ok(())
}
