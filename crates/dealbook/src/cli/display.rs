//! Display formatting utilities for CLI output

use colored::*;

use crate::models::{AiSummary, Deal, Review, ReviewPage};
use crate::server::types::{ListingData, StatusResponse};
use crate::services::TravelEstimate;

const WRAP_WIDTH: usize = 80;

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();
    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.chars().count() + 1 + word.chars().count() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(current_line);
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

pub fn display_deal(deal: &Deal) {
  if let Some(id) = &deal.id {
    println!("{} {}", "Id:".dimmed(), id.to_string().dimmed());
  }
  println!("{} {}", "Location:".bold(), deal.location.cyan());
  println!("{} {}", "Deal:".bold(), deal.deal);
  println!("{} {}", "Price:".bold(), deal.price.green());
  println!("{} {}", "Category:".bold(), deal.category.yellow());
  if let (Some(distance), Some(duration)) = (&deal.distance, &deal.duration) {
    let origin = deal.origin.as_deref().unwrap_or("origin");
    println!("{} {distance} ({duration}) from {origin}", "Distance:".bold());
  }
  if let Some(summary) = &deal.summary {
    println!("{}", "Summary:".bold());
    for line in wrap_text(summary, WRAP_WIDTH) {
      println!("  {line}");
    }
  }
}

/// Deals one block each, separated by `---`
pub fn display_deals(deals: &[Deal]) {
  for (i, deal) in deals.iter().enumerate() {
    if i > 0 {
      println!("---");
    }
    display_deal(deal);
  }
}

pub fn display_estimate(origin: &str, estimate: &TravelEstimate) {
  println!(
    "{} {} ({}) from {}",
    "Distance:".bold(),
    estimate.distance.cyan(),
    estimate.duration.cyan(),
    origin.yellow()
  );
}

pub fn display_listing(listing: &ListingData) {
  println!("=== {} ===", listing.name.blue().bold());
  println!("{} {}", "Id:".dimmed(), listing.id.to_string().dimmed());
  if let Some(property_type) = &listing.property_type {
    println!("{} {property_type}", "Type:".bold());
  }
  if let Some(location) = &listing.location {
    println!("{} {}", "Location:".bold(), location.cyan());
  }
  println!("{} {}", "Reviews:".bold(), listing.review_count);
  if let Some(summary) = &listing.summary {
    println!();
    for line in wrap_text(summary, WRAP_WIDTH) {
      println!("{line}");
    }
  }
  if let Some(ai_summary) = &listing.ai_summary {
    println!();
    display_ai_summary(ai_summary);
  }
}

pub fn display_ai_summary(ai_summary: &AiSummary) {
  println!("{}", "AI review summary:".magenta().bold());
  for line in wrap_text(&ai_summary.summary, WRAP_WIDTH) {
    println!("  {line}");
  }
  if !ai_summary.tags.is_empty() {
    let tags: Vec<String> = ai_summary.tags.iter().map(|t| format!("#{t}")).collect();
    println!("  {}", tags.join(" ").yellow());
  }
  if let Some(model) = &ai_summary.model {
    println!("  {}", format!("({model})").dimmed());
  }
}

pub fn display_review(review: &Review) {
  let date = review.date.as_ref().map(|d| d.to_string()).unwrap_or_default();
  println!("{} {}", review.reviewer_name.bold(), date.dimmed());
  for line in wrap_text(&review.comments, WRAP_WIDTH - 2) {
    println!("  {line}");
  }
}

pub fn display_review_page(page: &ReviewPage) {
  if page.reviews.is_empty() {
    println!("No reviews on page {} ({} reviews in total).", page.page, page.total);
    return;
  }

  for review in &page.reviews {
    display_review(review);
    println!();
  }
  println!("{}", format!("Page {} of {} ({} reviews)", page.page, page.total_pages, page.total).dimmed());
  if page.has_next() {
    println!("{}", format!("Next: --page {}", page.page + 1).dimmed());
  }
}

pub fn display_status(server: &str, status: &StatusResponse) {
  println!("{} {} at {}", "✓".green(), status.status.green(), server.cyan());
  println!("  version: {}", status.version);
  println!("  deals: {}", status.deals);
  println!("  summarized listings: {}", status.summarized_listings);
}
