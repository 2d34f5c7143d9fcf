//! Admin endpoints: shopkeeper review, reference-data management,
//! cross-shop part listings, and dashboard totals

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AccountStatus, Pagination, PartListResponse, PartQuery, ReviewError, Role, UserView,
    review_transition,
};
use crate::repositories::PartScope;
use crate::state::AppState;
use crate::validation::validate_required;

const MANAGEMENT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub status: String,
}

/// GET /api/admin/pending-shopkeepers
pub async fn pending_shopkeepers(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let shopkeepers = state
        .user_repository
        .list_shopkeepers(Some(AccountStatus::Pending))
        .await?;
    Ok(Json(json!({ "shopkeepers": shopkeepers })))
}

/// GET /api/admin/all-shopkeepers
pub async fn all_shopkeepers(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let shopkeepers = state.user_repository.list_shopkeepers(None).await?;
    Ok(Json(json!({ "shopkeepers": shopkeepers })))
}

/// PUT /api/admin/approve-shopkeeper/:id
pub async fn approve_shopkeeper(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Json<Value>> {
    let decision = match request.status.as_str() {
        "approved" => AccountStatus::Approved,
        "rejected" => AccountStatus::Rejected,
        _ => return Err(ApiError::InvalidReview(ReviewError::NotADecision)),
    };

    let user = state
        .user_repository
        .find_by_id(id)
        .await?
        .filter(|u| u.role == Role::Shopkeeper)
        .ok_or(ApiError::NotFound("Shopkeeper"))?;

    let next = review_transition(user.status, decision)?;
    let user = state.user_repository.set_status(user.id, next).await?;
    let profile = state.user_repository.profile_of(user.id).await?;

    info!("Shopkeeper {} reviewed: {}", user.email, next.as_str());

    let message = match next {
        AccountStatus::Approved => "Shopkeeper approved successfully",
        _ => "Shopkeeper rejected successfully",
    };

    Ok(Json(json!({
        "message": message,
        "shopkeeper": UserView::from_parts(user, profile),
    })))
}

/// GET /api/admin/shopkeeper/:id
pub async fn shopkeeper_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PartQuery>,
) -> ApiResult<Json<Value>> {
    let user = state
        .user_repository
        .find_by_id(id)
        .await?
        .filter(|u| u.role == Role::Shopkeeper)
        .ok_or(ApiError::NotFound("Shopkeeper"))?;
    let profile = state.user_repository.profile_of(user.id).await?;

    let pagination = Pagination::resolve(query.page, query.limit, MANAGEMENT_PAGE_SIZE);
    let (parts, total) = state
        .part_repository
        .list(PartScope::Shopkeeper(id), &query, pagination)
        .await?;
    let listing = PartListResponse::new(parts, total, pagination);

    Ok(Json(json!({
        "shopkeeper": UserView::from_parts(user, profile),
        "parts": listing.parts,
        "total": listing.total,
        "currentPage": listing.current_page,
        "totalPages": listing.total_pages,
    })))
}

/// GET /api/admin/all-parts
pub async fn all_parts(
    State(state): State<AppState>,
    Query(query): Query<PartQuery>,
) -> ApiResult<Json<PartListResponse>> {
    let pagination = Pagination::resolve(query.page, query.limit, MANAGEMENT_PAGE_SIZE);
    let (parts, total) = state
        .part_repository
        .list(PartScope::Admin, &query, pagination)
        .await?;
    Ok(Json(PartListResponse::new(parts, total, pagination)))
}

/// GET /api/admin/dashboard-stats
pub async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let accounts = state.user_repository.account_stats().await?;
    let (total_parts, available_parts, sold_parts) =
        state.part_repository.global_stats().await?;

    Ok(Json(json!({
        "totalShopkeepers": accounts.total_shopkeepers,
        "pendingShopkeepers": accounts.pending_shopkeepers,
        "approvedShopkeepers": accounts.approved_shopkeepers,
        "totalCustomers": accounts.total_customers,
        "totalParts": total_parts,
        "availableParts": available_parts,
        "soldParts": sold_parts,
    })))
}

/// POST /api/admin/car-companies
pub async fn create_company(
    State(state): State<AppState>,
    Json(request): Json<crate::models::CreateCompanyRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_required("Company name", &request.name).map_err(ApiError::Validation)?;

    let name = request.name.trim();
    if state.catalog_repository.company_name_exists(name).await? {
        return Err(ApiError::Duplicate("Car company"));
    }

    let company = state
        .catalog_repository
        .create_company(name, request.logo.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Car company added successfully", "company": company })),
    ))
}

/// POST /api/admin/car-models
pub async fn create_model(
    State(state): State<AppState>,
    Json(request): Json<crate::models::CreateModelRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_required("Model name", &request.name).map_err(ApiError::Validation)?;
    if !(1900..=2100).contains(&request.year) {
        return Err(ApiError::Validation("Please enter a valid year".to_string()));
    }
    if !state.catalog_repository.company_exists(request.company).await? {
        return Err(ApiError::NotFound("Car company"));
    }

    let model = state
        .catalog_repository
        .create_model(
            request.name.trim(),
            request.year,
            request.variant.as_deref(),
            request.company,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Car model added successfully", "model": model })),
    ))
}

/// POST /api/admin/part-categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<crate::models::CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_required("Category name", &request.name).map_err(ApiError::Validation)?;

    let name = request.name.trim();
    if state.catalog_repository.category_name_exists(name).await? {
        return Err(ApiError::Duplicate("Category"));
    }

    let category = state
        .catalog_repository
        .create_category(name, request.description.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Category added successfully", "category": category })),
    ))
}

/// DELETE /api/admin/car-companies/:id
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !state.catalog_repository.deactivate_company(id).await? {
        return Err(ApiError::NotFound("Car company"));
    }
    Ok(Json(json!({ "message": "Car company deleted successfully" })))
}

/// DELETE /api/admin/car-models/:id
pub async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !state.catalog_repository.deactivate_model(id).await? {
        return Err(ApiError::NotFound("Car model"));
    }
    Ok(Json(json!({ "message": "Car model deleted successfully" })))
}

/// DELETE /api/admin/part-categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !state.catalog_repository.deactivate_category(id).await? {
        return Err(ApiError::NotFound("Category"));
    }
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
