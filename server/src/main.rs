use anyhow::Result;
use axum::Router;
use clap::Parser;
use marksearch_core::{EngineConfig, SearchEngine};
use marksearch_server::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Engine data directory
    #[arg(long, default_value = "./data")]
    data: PathBuf,
    /// Stop-word file (quoted words); builtin list is used when unreadable
    #[arg(long, default_value = "StopWords.txt")]
    stop_words: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let engine = SearchEngine::open(&EngineConfig {
        data_dir: args.data,
        stop_words_path: Some(args.stop_words),
    })?;
    let app: Router = build_app(Arc::new(engine));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
