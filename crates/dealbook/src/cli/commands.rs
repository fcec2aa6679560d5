//! Terminal commands. Each one is a single call against the REST API.

use anyhow::Result;
use colored::*;

use crate::cli::client::{ClientError, DealbookClient};
use crate::cli::display;
use crate::models::{NewDeal, NewReview};

pub async fn add_deal(client: &DealbookClient, new_deal: NewDeal) -> Result<()> {
  let deal = client.add_deal(&new_deal).await?;
  let id = deal.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
  println!("{} Saved deal {} at {}", "✓".green(), id.yellow(), deal.location.cyan());
  Ok(())
}

pub async fn list_deals(client: &DealbookClient, location: Option<&str>, category: Option<&str>) -> Result<()> {
  let deals = client.list_deals(location, category).await?;

  if deals.is_empty() {
    println!("No deals found.");
    return Ok(());
  }

  display::display_deals(&deals);
  Ok(())
}

pub async fn show_deal(client: &DealbookClient, id: &str) -> Result<()> {
  let deal = client.get_deal(id).await?;
  display::display_deal(&deal);
  Ok(())
}

/// A maps failure is reported as a warning; the command still succeeds
pub async fn deal_distance(client: &DealbookClient, id: &str, origin: &str) -> Result<()> {
  let response = match client.deal_distance(id, origin).await {
    Ok(response) => response,
    Err(e) => match e.downcast_ref::<ClientError>() {
      Some(client_error) if client_error.key() == Some("maps_unavailable") => {
        println!("{} Could not compute distance: {}", "⚠".yellow(), client_error.to_string().yellow());
        return Ok(());
      }
      _ => return Err(e),
    },
  };

  match &response.estimate {
    Some(estimate) => display::display_estimate(&response.origin, estimate),
    None => println!("{} No route found from {}", "⚠".yellow(), response.origin.yellow()),
  }
  Ok(())
}

pub async fn deal_summary(client: &DealbookClient, id: &str) -> Result<()> {
  let summary = client.deal_summary(id).await?;
  for line in display::wrap_text(&summary, 80) {
    println!("{line}");
  }
  Ok(())
}

pub async fn show_listing(client: &DealbookClient, id: &str) -> Result<()> {
  let listing = client.get_listing(id).await?;
  display::display_listing(&listing);
  Ok(())
}

pub async fn list_reviews(client: &DealbookClient, id: &str, page: usize, page_size: usize) -> Result<()> {
  let page = client.list_reviews(id, page, page_size).await?;
  display::display_review_page(&page);
  Ok(())
}

pub async fn add_review(client: &DealbookClient, id: &str, review: NewReview) -> Result<()> {
  let review = client.add_review(id, &review).await?;
  println!("{} Added review by {} to listing {}", "✓".green(), review.reviewer_name.cyan(), id.yellow());
  Ok(())
}

pub async fn listing_summary(client: &DealbookClient, id: &str, force: bool) -> Result<()> {
  let ai_summary = client.listing_summary(id, force).await?;
  display::display_ai_summary(&ai_summary);
  Ok(())
}

pub async fn status(client: &DealbookClient) -> Result<()> {
  let status = client.status().await?;
  display::display_status(client.base_url(), &status);
  Ok(())
}
