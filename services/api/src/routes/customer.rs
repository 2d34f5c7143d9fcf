//! Customer endpoints: the public-facing part search and detail views
//!
//! Everything here runs in the customer scope, so only `available` parts
//! are ever visible.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Availability, Pagination, PartListResponse, PartQuery};
use crate::repositories::PartScope;
use crate::state::AppState;

const BROWSE_PAGE_SIZE: u32 = 12;
const SIMILAR_LIMIT: i64 = 6;
const FEATURED_DEFAULT: u32 = 8;

#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
    pub limit: Option<u32>,
}

/// GET /api/customer/search-parts
pub async fn search_parts(
    State(state): State<AppState>,
    Query(query): Query<PartQuery>,
) -> ApiResult<Json<PartListResponse>> {
    let pagination = Pagination::resolve(query.page, query.limit, BROWSE_PAGE_SIZE);
    let (parts, total) = state
        .part_repository
        .list(PartScope::Customer, &query, pagination)
        .await?;
    Ok(Json(PartListResponse::new(parts, total, pagination)))
}

/// GET /api/customer/part/:id
///
/// Sold and reserved parts are indistinguishable from unknown ids here.
pub async fn part_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let part = state
        .part_repository
        .get_view(id)
        .await?
        .filter(|p| p.availability == Availability::Available)
        .ok_or(ApiError::NotFound("Part"))?;

    Ok(Json(json!({ "part": part })))
}

/// GET /api/customer/similar-parts/:id
pub async fn similar_parts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let parts = state
        .part_repository
        .similar(id, SIMILAR_LIMIT)
        .await?
        .ok_or(ApiError::NotFound("Part"))?;

    Ok(Json(json!({ "parts": parts })))
}

/// GET /api/customer/featured-parts?limit
pub async fn featured_parts(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> ApiResult<Json<Value>> {
    let limit = query
        .limit
        .unwrap_or(FEATURED_DEFAULT)
        .clamp(1, Pagination::MAX_LIMIT);
    let parts = state.part_repository.featured(limit as i64).await?;
    Ok(Json(json!({ "parts": parts })))
}
