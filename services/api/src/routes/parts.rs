//! Public reference-data and search-suggestion endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub q: Option<String>,
}

/// GET /api/parts/car-companies
pub async fn car_companies(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let companies = state.catalog_repository.active_companies().await?;
    Ok(Json(json!({ "companies": companies })))
}

/// GET /api/parts/car-models/:companyId
pub async fn car_models(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let models = state.catalog_repository.models_by_company(company_id).await?;
    Ok(Json(json!({ "models": models })))
}

/// GET /api/parts/categories
pub async fn categories(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let categories = state.catalog_repository.active_categories().await?;
    Ok(Json(json!({ "categories": categories })))
}

/// GET /api/parts/search-suggestions?q=
///
/// Terms shorter than two characters return an empty list rather than
/// scanning the whole catalog.
pub async fn search_suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> ApiResult<Json<Value>> {
    let term = query.q.as_deref().unwrap_or("").trim().to_string();
    if term.len() < 2 {
        return Ok(Json(json!({ "suggestions": [] })));
    }

    let suggestions = state.catalog_repository.suggestions(&term).await?;
    Ok(Json(json!({ "suggestions": suggestions })))
}
