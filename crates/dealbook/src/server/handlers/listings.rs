//! Listing and review endpoint handlers

use axum::{
  body::Bytes,
  extract::{Extension, Json, Path, Query, State},
  http::StatusCode,
  response::Json as ResponseJson,
};

use super::{failure, parse_key, ApiFailure, ApiResult};
use crate::models::review::DEFAULT_PAGE_SIZE;
use crate::models::{NewReview, ReviewPage};
use crate::server::{
  middleware::RequestContext,
  state::AppState,
  types::{
    BaseResponse, ListingData, ListingResponse, ListingSummaryRequest, ListingSummaryResponse,
    ReviewResponse, ReviewsQuery,
  },
};
use crate::services::ServiceError;

const COMPONENT: &str = "listings-api";

/// GET /listings/{id}
pub async fn get_listing(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
) -> ApiResult<ListingResponse> {
  match state.listings.get_listing(&parse_key(&id)).await {
    Ok(listing) => {
      let response = ListingResponse { listing: ListingData::from(&listing) };
      Ok(ResponseJson(BaseResponse::success(response, context.request_id)))
    }
    Err(e) => Err(failure(&context, e, COMPONENT)),
  }
}

/// GET /listings/{id}/reviews?page=&page_size=
pub async fn list_reviews(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
  Query(query): Query<ReviewsQuery>,
) -> ApiResult<ReviewPage> {
  let page = query.page.unwrap_or(1);
  let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

  match state.listings.review_page(&parse_key(&id), page, page_size).await {
    Ok(reviews) => Ok(ResponseJson(BaseResponse::success(reviews, context.request_id))),
    Err(e) => Err(failure(&context, e, COMPONENT)),
  }
}

/// POST /listings/{id}/reviews
pub async fn add_review(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
  Json(request): Json<NewReview>,
) -> Result<(StatusCode, ResponseJson<BaseResponse<ReviewResponse>>), ApiFailure> {
  match state.listings.add_review(&parse_key(&id), request).await {
    Ok(review) => {
      context.log_info("Review added", COMPONENT);
      let response = BaseResponse::success(ReviewResponse { review }, context.request_id);
      Ok((StatusCode::CREATED, ResponseJson(response)))
    }
    Err(e) => Err(failure(&context, e, COMPONENT)),
  }
}

/// POST /listings/{id}/summary
pub async fn listing_summary(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
  body: Bytes,
) -> ApiResult<ListingSummaryResponse> {
  let key = parse_key(&id);
  // An empty body means no options
  let request: ListingSummaryRequest = if body.is_empty() {
    ListingSummaryRequest::default()
  } else {
    match serde_json::from_slice(&body) {
      Ok(request) => request,
      Err(e) => {
        let error = ServiceError::Validation(format!("Invalid request body: {e}"));
        return Err(failure(&context, error, COMPONENT));
      }
    }
  };
  let force = request.force;

  match state.listings.listing_summary(&key, force).await {
    Ok(ai_summary) => {
      let response = ListingSummaryResponse { listing_id: key.to_string(), ai_summary };
      Ok(ResponseJson(BaseResponse::success(response, context.request_id)))
    }
    Err(e) => Err(failure(&context, e, COMPONENT)),
  }
}
