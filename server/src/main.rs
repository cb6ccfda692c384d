use anyhow::Result;
use axum::Router;
use clap::Parser;
use lookback_core::{SearchConfig, SearchSystem};
use lookback_server::build_app;
use lookback_server::posts::{corpus, load_posts};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "lookback-server")]
#[command(about = "Keyword search API over a sample of StackOverflow posts")]
struct Args {
    /// Posts JSON file to index at startup
    #[arg(long, default_value = "./posts-sample.json")]
    corpus: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Maximum number of results per search
    #[arg(long, default_value_t = lookback_core::config::DEFAULT_MAX_RESULTS)]
    max_results: usize,
    /// Reject wildcard terms that start with '*' or '?'
    #[arg(long, default_value_t = false)]
    no_leading_wildcard: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let posts = load_posts(&args.corpus)?;
    tracing::info!(posts = posts.len(), corpus = %args.corpus.display(), "loaded posts");
    let config = SearchConfig { max_results: args.max_results, allow_leading_wildcard: !args.no_leading_wildcard };
    let search = SearchSystem::build(corpus(posts), config)?;
    let app: Router = build_app(Arc::new(search));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "search server is serving traffic");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
