//! Prompt text for the summarizer

use crate::models::{Deal, Listing};

/// Reviews fed into a listing summary
pub const MAX_PROMPT_REVIEWS: usize = 20;

/// Characters kept from each review comment
pub const MAX_COMMENT_CHARS: usize = 500;

pub fn deal_prompt(deal: &Deal) -> String {
  format!(
    "Write a short, friendly summary of this deal for someone deciding whether to go.\n\
     Location: {}\nDeal: {}\nPrice: {}\nCategory: {}",
    deal.location, deal.deal, deal.price, deal.category
  )
}

fn truncate_chars(text: &str, max: usize) -> String {
  match text.char_indices().nth(max) {
    Some((cut, _)) => format!("{}...", &text[..cut]),
    None => text.to_string(),
  }
}

/// Summarise what guests say about a listing, from its most recent reviews
pub fn reviews_prompt(listing: &Listing) -> String {
  let mut prompt = format!(
    "Summarise the overall guest sentiment for \"{}\" and list a few short tags describing it.\n",
    listing.display_name()
  );
  if let Some(place) = listing.location_label() {
    prompt.push_str(&format!("Location: {place}\n"));
  }
  prompt.push_str("Reviews:\n");

  for review in listing.latest_reviews(MAX_PROMPT_REVIEWS) {
    let comment = truncate_chars(review.comments.trim(), MAX_COMMENT_CHARS);
    prompt.push_str(&format!("- {}: {}\n", review.reviewer_name, comment));
  }
  prompt
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::NewDeal;
  use serde_json::json;

  #[test]
  fn test_deal_prompt_lists_all_fields() {
    let deal = NewDeal::new("Lisbon", "Tram tour", "15", "Travel").into_deal();
    let prompt = deal_prompt(&deal);
    for expected in ["Location: Lisbon", "Deal: Tram tour", "Price: 15", "Category: Travel"] {
      assert!(prompt.contains(expected), "missing {expected}");
    }
  }

  #[test]
  fn test_reviews_prompt_keeps_latest_reviews() {
    let reviews: Vec<_> = (0..30)
      .map(|i| json!({ "_id": i.to_string(), "reviewer_name": format!("guest{i}"), "comments": "ok" }))
      .collect();
    let listing: Listing =
      serde_json::from_value(json!({ "_id": 1, "name": "Loft", "reviews": reviews })).unwrap();

    let prompt = reviews_prompt(&listing);
    assert!(prompt.contains("\"Loft\""));
    assert!(!prompt.contains("guest9:"));
    assert!(prompt.contains("guest10:"));
    assert!(prompt.contains("guest29:"));
  }

  #[test]
  fn test_truncate_respects_char_boundaries() {
    assert_eq!(truncate_chars("ãããã", 2), "ãã...");
    assert_eq!(truncate_chars("short", 10), "short");
  }
}
