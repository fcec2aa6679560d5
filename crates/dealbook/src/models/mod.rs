//! Records kept in the document store

pub mod deal;
pub mod listing;
pub mod review;

pub use deal::{Deal, NewDeal};
pub use listing::{AiSummary, Listing};
pub use review::{NewReview, Review, ReviewDate, ReviewPage};
