use anyhow::Result;
use axum::Router;
use clap::Parser;
use docsearch_server::{build_app, parse_index_arg};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index directory, optionally prefixed with a version name: `v0.3.4=./index/v0.3.4`.
    /// Repeatable; the first one is served by default.
    #[arg(long, default_value = "./index")]
    index: Vec<String>,
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
    let indexes: Vec<_> = args.index.iter().map(|s| parse_index_arg(s)).collect();
    let app: Router = build_app(&indexes)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
