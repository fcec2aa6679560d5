//! Deal endpoint handlers

use axum::{
  extract::{Extension, Json, Path, Query, State},
  http::StatusCode,
  response::Json as ResponseJson,
};

use super::{failure, parse_key, ApiFailure, ApiResult};
use crate::models::NewDeal;
use crate::services::ServiceError;
use crate::server::{
  middleware::RequestContext,
  state::AppState,
  types::{
    BaseResponse, DealResponse, DistanceRequest, DistanceResponse, ListDealsQuery, ListDealsResponse,
    SummaryRequest, SummaryResponse,
  },
};

const COMPONENT: &str = "deals-api";

/// POST /deals - Save a new deal
pub async fn save_deal(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<NewDeal>,
) -> Result<(StatusCode, ResponseJson<BaseResponse<DealResponse>>), ApiFailure> {
  match state.deals.save_deal(request).await {
    Ok(deal) => {
      context.log_info("Deal saved", COMPONENT);
      Ok((StatusCode::CREATED, ResponseJson(BaseResponse::success(DealResponse { deal }, context.request_id))))
    }
    Err(e) => Err(failure(&context, e, COMPONENT)),
  }
}

/// GET /deals - List deals, optionally filtered by location and category
pub async fn list_deals(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Query(query): Query<ListDealsQuery>,
) -> ApiResult<ListDealsResponse> {
  match state.deals.filtered_deals(query.location.as_deref(), query.category.as_deref()).await {
    Ok(deals) => {
      let count = deals.len();
      Ok(ResponseJson(BaseResponse::success(ListDealsResponse { deals, count }, context.request_id)))
    }
    Err(e) => Err(failure(&context, e, COMPONENT)),
  }
}

/// GET /deals/{id} - Fetch one deal
pub async fn get_deal(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
) -> ApiResult<DealResponse> {
  match state.deals.get_deal(&parse_key(&id)).await {
    Ok(deal) => Ok(ResponseJson(BaseResponse::success(DealResponse { deal }, context.request_id))),
    Err(e) => Err(failure(&context, e, COMPONENT)),
  }
}

/// POST /deals/{id}/distance - Travel estimate from an origin to the deal
pub async fn deal_distance(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
  Json(request): Json<DistanceRequest>,
) -> ApiResult<DistanceResponse> {
  let key = parse_key(&id);
  match state.deals.deal_distance(&key, &request.origin).await {
    Ok(estimate) => {
      if estimate.is_none() {
        context.log_warn(&format!("No route from {} to deal {key}", request.origin), COMPONENT);
      }
      let response = DistanceResponse { deal_id: key.to_string(), origin: request.origin, estimate };
      Ok(ResponseJson(BaseResponse::success(response, context.request_id)))
    }
    Err(e) => Err(failure(&context, e, COMPONENT)),
  }
}

/// POST /summary - Generate (or return the cached) summary of a deal
pub async fn deal_summary(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<SummaryRequest>,
) -> ApiResult<SummaryResponse> {
  if request.deal_id.trim().is_empty() {
    return Err(failure(&context, ServiceError::Validation("deal_id is required".to_string()), COMPONENT));
  }

  let key = parse_key(&request.deal_id);
  match state.deals.deal_summary(&key).await {
    Ok(summary) => {
      let response = SummaryResponse { deal_id: key.to_string(), summary };
      Ok(ResponseJson(BaseResponse::success(response, context.request_id)))
    }
    Err(e) => Err(failure(&context, e, COMPONENT)),
  }
}
