//! Endpoint handlers

use axum::{http::StatusCode, response::Json};
use serde_json::json;

use crate::server::middleware::RequestContext;
use crate::server::types::{ApiError, BaseResponse};
use crate::services::ServiceError;
use crate::store::DocumentKey;

pub mod deals;
pub mod listings;
pub mod status;

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<BaseResponse<()>>);

pub type ApiResult<T> = Result<Json<BaseResponse<T>>, ApiFailure>;

/// Path segments always parse; the key kind is inferred from the text
pub fn parse_key(id: &str) -> DocumentKey {
  match id.trim().parse() {
    Ok(key) => key,
    Err(never) => match never {},
  }
}

/// Map a service error to a status code and error envelope, logging it
pub fn failure(context: &RequestContext, error: ServiceError, component: &str) -> ApiFailure {
  let (status, key) = match &error {
    ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
    ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
    ServiceError::NoReviews { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "no_reviews"),
    ServiceError::Maps(_) => (StatusCode::BAD_GATEWAY, "maps_unavailable"),
    ServiceError::Llm(_) => (StatusCode::BAD_GATEWAY, "summarizer_unavailable"),
    ServiceError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_failed"),
  };

  let message = error.to_string();
  if status.is_server_error() {
    context.log_error(&message, component);
  } else {
    context.log_warn(&message, component);
  }

  let error = ApiError::new(key, &message).with_context(json!({ "status": status.as_u16() }));
  (status, Json(BaseResponse::<()>::error(vec![error], context.request_id)))
}
