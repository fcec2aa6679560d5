//! Bulk loader for the listings dataset

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use dealbook::config::{init_logging, load_dotenv, StoreArgs};
use dealbook::ingest::{self, DocumentSource, HfRowsSource, JsonlSource, RowsConfig};

#[derive(Parser)]
#[command(name = "dealbook_ingest")]
#[command(about = "Load listings into the document store in batches")]
#[command(version)]
struct Args {
  /// JSON Lines file to load; the Hugging Face dataset is used when omitted
  #[arg(long)]
  file: Option<PathBuf>,

  /// Hugging Face dataset name
  #[arg(long, default_value = ingest::DEFAULT_DATASET)]
  dataset: String,

  /// Dataset split
  #[arg(long, default_value = "train")]
  split: String,

  /// Datasets-server rows endpoint
  #[arg(long, env = "HF_ROWS_URL", default_value = ingest::DEFAULT_ROWS_URL)]
  rows_url: String,

  /// Documents per insert
  #[arg(long, default_value_t = ingest::DEFAULT_BATCH_SIZE)]
  batch_size: usize,

  /// Stop after this many documents
  #[arg(long)]
  limit: Option<usize>,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,

  #[command(flatten)]
  store: StoreArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
  load_dotenv();
  let args = Args::parse();
  init_logging(args.verbose, "dealbook=warn,mongodb=warn,warn");

  let mut source: Box<dyn DocumentSource> = match &args.file {
    Some(path) => Box::new(JsonlSource::open(path).await?),
    None => Box::new(HfRowsSource::new(RowsConfig {
      base_url: args.rows_url.clone(),
      dataset: args.dataset.clone(),
      split: args.split.clone(),
      ..RowsConfig::default()
    })?),
  };

  let stores = args.store.open().await?;
  ingest::ingest(stores.listings.as_ref(), source.as_mut(), args.batch_size, args.limit, |n| {
    println!("{n} records ingested");
  })
  .await?;

  println!("All records ingested successfully!");
  Ok(())
}
