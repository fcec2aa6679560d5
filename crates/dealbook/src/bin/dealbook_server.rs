//! Dealbook REST Server
//!
//! HTTP API over the deal and listing store, with distance lookups and
//! LLM summaries.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;

use dealbook::config::{init_logging, load_dotenv, ServiceArgs, StoreArgs};
use dealbook::server::{start_server, AppState};

#[derive(Parser)]
#[command(name = "dealbook_server")]
#[command(about = "Dealbook REST API Server")]
#[command(version)]
struct Args {
  /// Server bind address
  #[arg(long, env = "DEALBOOK_BIND", default_value = "127.0.0.1:3000")]
  bind: SocketAddr,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,

  #[command(flatten)]
  store: StoreArgs,

  #[command(flatten)]
  services: ServiceArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
  load_dotenv();
  let args = Args::parse();
  init_logging(args.verbose, "dealbook=info,tower_http=warn,mongodb=warn,warn");

  tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting dealbook server");

  let stores = args.store.open().await?;
  let state = AppState::new(stores, args.services.distance_service()?, args.services.summarizer()?);

  start_server(args.bind, state).await
}
