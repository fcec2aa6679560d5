//! Status and version endpoint handlers

use axum::{
  extract::{Extension, State},
  response::Json,
};
use uuid::Uuid;

use super::{failure, ApiResult};
use crate::server::{
  middleware::RequestContext,
  state::AppState,
  types::{BaseResponse, StatusResponse, VersionResponse},
};

/// GET /status - Health check with store counts
pub async fn status(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> ApiResult<StatusResponse> {
  let version = env!("CARGO_PKG_VERSION");

  let deals = match state.deals.deal_count().await {
    Ok(count) => count,
    Err(e) => return Err(failure(&context, e, "status-api")),
  };
  let summarized_listings = match state.listings.summarized_count().await {
    Ok(count) => count,
    Err(e) => return Err(failure(&context, e, "status-api")),
  };

  let response =
    StatusResponse { status: "healthy".to_string(), version: version.to_string(), deals, summarized_listings };
  Ok(Json(BaseResponse::success(response, context.request_id)))
}

/// GET /version - Returns current API version
pub async fn version() -> Json<BaseResponse<VersionResponse>> {
  let transaction_id = Uuid::new_v4();
  let version = env!("CARGO_PKG_VERSION");
  let response = VersionResponse { version: version.to_string() };

  Json(BaseResponse::success(response, transaction_id))
}
