//! Domain services and the external APIs they call

use thiserror::Error;

use crate::store::{DocumentKey, StoreError};

pub mod deals;
pub mod listings;
pub mod llm;
pub mod maps;
pub mod prompts;

pub use deals::DealService;
pub use listings::ListingService;
pub use llm::{ChatCompletionsClient, LlmConfig, LlmError, StructuredSummary, Summarizer};
pub use maps::{DistanceMatrixClient, DistanceService, MapsConfig, MapsError, TravelEstimate};

#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("{0}")]
  Validation(String),

  #[error("{kind} {key} not found")]
  NotFound { kind: &'static str, key: DocumentKey },

  #[error("Listing {key} has no reviews to summarise")]
  NoReviews { key: DocumentKey },

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Maps(#[from] MapsError),

  #[error(transparent)]
  Llm(#[from] LlmError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
