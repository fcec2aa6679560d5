use anyhow::Result;
use clap::{Parser, Subcommand};
use dealbook::cli::{client::DEFAULT_SERVER_URL, commands, ClientConfig, DealbookClient};
use dealbook::models::review::DEFAULT_PAGE_SIZE;
use dealbook::models::{NewDeal, NewReview};

#[derive(Parser)]
#[command(name = "dealbook")]
#[command(about = "Dealbook - browse deals and listings\nTerminal client for a running dealbook_server")]
#[command(version)]
struct Cli {
  /// Base URL of the dealbook server
  #[arg(long, global = true, env = "DEALBOOK_SERVER", default_value = DEFAULT_SERVER_URL)]
  server: String,

  /// Request timeout in seconds
  #[arg(long, global = true, env = "DEALBOOK_TIMEOUT_SECS", default_value = "30")]
  timeout: u64,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Save a new deal
  Add {
    location: String,
    deal: String,
    price: String,
    category: String,
  },
  /// List deals, optionally filtered
  List {
    #[arg(short, long)]
    location: Option<String>,
    #[arg(short, long)]
    category: Option<String>,
  },
  /// Show one deal
  Show { id: String },
  /// Travel distance from an origin to a deal
  Distance {
    id: String,
    /// Starting address
    #[arg(long = "from")]
    origin: String,
  },
  /// Summarize a deal (cached after the first call)
  Summary { id: String },
  /// Show a listing
  Listing { id: String },
  /// Page through a listing's reviews
  Reviews {
    id: String,
    #[arg(short, long, default_value = "1")]
    page: usize,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
  },
  /// Add a review to a listing
  Review { id: String, name: String, comment: String },
  /// AI digest of a listing's reviews
  ListingSummary {
    id: String,
    /// Regenerate even when a summary is cached
    #[arg(short, long)]
    force: bool,
  },
  /// Check that the server is up
  Status,
}

async fn handle(client: &DealbookClient, command: Command) -> Result<()> {
  match command {
    Command::Add { location, deal, price, category } => {
      commands::add_deal(client, NewDeal::new(&location, &deal, &price, &category)).await
    }
    Command::List { location, category } => {
      commands::list_deals(client, location.as_deref(), category.as_deref()).await
    }
    Command::Show { id } => commands::show_deal(client, &id).await,
    Command::Distance { id, origin } => commands::deal_distance(client, &id, &origin).await,
    Command::Summary { id } => commands::deal_summary(client, &id).await,
    Command::Listing { id } => commands::show_listing(client, &id).await,
    Command::Reviews { id, page, page_size } => commands::list_reviews(client, &id, page, page_size).await,
    Command::Review { id, name, comment } => {
      commands::add_review(client, &id, NewReview { reviewer_name: name, comments: comment }).await
    }
    Command::ListingSummary { id, force } => commands::listing_summary(client, &id, force).await,
    Command::Status => commands::status(client).await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  dealbook::config::load_dotenv();
  let cli = Cli::parse();
  dealbook::config::init_logging(false, "warn");

  let client = DealbookClient::with_config(ClientConfig { base_url: cli.server, timeout_secs: cli.timeout })?;
  handle(&client, cli.command).await
}
