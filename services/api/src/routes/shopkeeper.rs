//! Shopkeeper endpoints: own-inventory listings, part creation with image
//! uploads, partial updates, and the sold/soft-delete transitions
//!
//! Part creation and update arrive as multipart forms: scalar fields plus
//! up to five image files. Images are written to disk before the database
//! write; when that write fails, the files just written are removed again.

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::{
    Availability, Condition, NewPart, Pagination, PartListResponse, PartQuery, PartUpdate,
};
use crate::repositories::PartScope;
use crate::state::AppState;
use crate::uploads::{MAX_IMAGE_BYTES, MAX_IMAGES_PER_PART, is_allowed_image};
use crate::validation::{validate_price, validate_required};

const MANAGEMENT_PAGE_SIZE: u32 = 10;

/// Scalar fields and raw image payloads pulled out of a multipart form
#[derive(Default)]
struct PartForm {
    fields: std::collections::HashMap<String, String>,
    images: Vec<(String, Vec<u8>)>,
}

impl PartForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = PartForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Validation(format!("Malformed form data: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "images" {
                let file_name = field.file_name().unwrap_or("").to_string();
                if !is_allowed_image(&file_name) {
                    return Err(ApiError::Validation(
                        "Only image files are allowed (jpeg, jpg, png, gif, webp)".to_string(),
                    ));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read image: {e}")))?;
                if bytes.len() > MAX_IMAGE_BYTES {
                    return Err(ApiError::Validation(
                        "Each image must be at most 5MB".to_string(),
                    ));
                }
                if form.images.len() >= MAX_IMAGES_PER_PART {
                    return Err(ApiError::Validation("Maximum 5 images allowed".to_string()));
                }
                form.images.push((file_name, bytes.to_vec()));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Malformed form data: {e}")))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &str, label: &str) -> ApiResult<&str> {
        self.text(name)
            .ok_or_else(|| ApiError::Validation(format!("{label} is required")))
    }

    fn price(&self, name: &str, label: &str) -> ApiResult<Option<f64>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => {
                let value: f64 = raw
                    .parse()
                    .map_err(|_| ApiError::Validation(format!("{label} must be a number")))?;
                validate_price(label, value).map_err(ApiError::Validation)?;
                Ok(Some(value))
            }
        }
    }

    fn uuid(&self, name: &str, label: &str) -> ApiResult<Option<Uuid>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ApiError::Validation(format!("{label} is not a valid id"))),
        }
    }
}

/// Write the form's images to the store, rolling back on any failure
async fn save_images(state: &AppState, images: &[(String, Vec<u8>)]) -> ApiResult<Vec<String>> {
    let mut urls = Vec::with_capacity(images.len());
    for (file_name, bytes) in images {
        match state.image_store.save(file_name, bytes).await {
            Ok(url) => urls.push(url),
            Err(e) => {
                discard_images(state, &urls).await;
                return Err(ApiError::Internal(e));
            }
        }
    }
    Ok(urls)
}

async fn discard_images(state: &AppState, urls: &[String]) {
    for url in urls {
        state.image_store.remove(url).await;
    }
}

async fn owned_part(state: &AppState, part_id: Uuid, shopkeeper_id: Uuid) -> ApiResult<()> {
    let owner = state
        .part_repository
        .owner_of(part_id)
        .await?
        .ok_or(ApiError::NotFound("Part"))?;
    if owner != shopkeeper_id {
        return Err(ApiError::Forbidden("Access denied. Not your part."));
    }
    Ok(())
}

/// GET /api/shopkeeper/dashboard-stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Value>> {
    let stats = state
        .part_repository
        .stats_for_shopkeeper(current.user.id)
        .await?;
    Ok(Json(json!({ "stats": stats })))
}

/// GET /api/shopkeeper/my-parts
pub async fn my_parts(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<PartQuery>,
) -> ApiResult<Json<PartListResponse>> {
    let pagination = Pagination::resolve(query.page, query.limit, MANAGEMENT_PAGE_SIZE);
    let (parts, total) = state
        .part_repository
        .list(PartScope::Shopkeeper(current.user.id), &query, pagination)
        .await?;
    Ok(Json(PartListResponse::new(parts, total, pagination)))
}

/// POST /api/shopkeeper/add-part
pub async fn add_part(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let form = PartForm::read(multipart).await?;

    let name = form.required("name", "Part name")?.to_string();
    validate_required("Part name", &name).map_err(ApiError::Validation)?;

    let selling_price = form
        .price("sellingPrice", "Selling price")?
        .ok_or_else(|| ApiError::Validation("Selling price is required".to_string()))?;
    let purchased_price = form.price("purchasedPrice", "Purchased price")?;

    let condition = Condition::parse(form.required("condition", "Condition")?)
        .ok_or_else(|| ApiError::Validation("Invalid condition".to_string()))?;

    let company_id = form
        .uuid("company", "Car company")?
        .ok_or_else(|| ApiError::Validation("Car company is required".to_string()))?;
    let model_id = form
        .uuid("model", "Car model")?
        .ok_or_else(|| ApiError::Validation("Car model is required".to_string()))?;
    let category_id = form
        .uuid("category", "Category")?
        .ok_or_else(|| ApiError::Validation("Category is required".to_string()))?;

    let image_urls = save_images(&state, &form.images).await?;

    // Location and contact are denormalized from the owner at creation
    let new_part = NewPart {
        name,
        description: form.text("description").map(str::to_string),
        selling_price,
        purchased_price,
        condition,
        warranty: form.text("warranty").map(str::to_string),
        company_id,
        model_id,
        category_id,
        shopkeeper_id: current.user.id,
        location_city: current.profile.as_ref().map(|p| p.city.clone()),
        location_state: current.profile.as_ref().map(|p| p.state.clone()),
        location_pincode: current.profile.as_ref().map(|p| p.pincode.clone()),
        contact_phone: Some(current.user.phone.clone()),
        contact_email: Some(current.user.email.clone()),
        images: image_urls.clone(),
    };

    let part = match state.part_repository.create(&new_part).await {
        Ok(part) => part,
        Err(e) => {
            discard_images(&state, &image_urls).await;
            return Err(ApiError::Internal(e));
        }
    };

    info!("Shopkeeper {} added part {}", current.user.email, part.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Part added successfully", "part": part })),
    ))
}

/// PUT /api/shopkeeper/update-part/:id
pub async fn update_part(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    owned_part(&state, id, current.user.id).await?;

    let form = PartForm::read(multipart).await?;

    let availability = match form.text("availability") {
        None => None,
        Some(raw) => Some(
            Availability::parse(raw)
                .ok_or_else(|| ApiError::Validation("Invalid availability".to_string()))?,
        ),
    };
    let condition = match form.text("condition") {
        None => None,
        Some(raw) => Some(
            Condition::parse(raw)
                .ok_or_else(|| ApiError::Validation("Invalid condition".to_string()))?,
        ),
    };

    let update = PartUpdate {
        name: form.text("name").map(str::to_string),
        description: form.text("description").map(str::to_string),
        selling_price: form.price("sellingPrice", "Selling price")?,
        purchased_price: form.price("purchasedPrice", "Purchased price")?,
        condition,
        availability,
        warranty: form.text("warranty").map(str::to_string),
        company_id: form.uuid("company", "Car company")?,
        model_id: form.uuid("model", "Car model")?,
        category_id: form.uuid("category", "Category")?,
    };

    let image_urls = save_images(&state, &form.images).await?;

    let part = match state.part_repository.update(id, &update, &image_urls).await {
        Ok(part) => part,
        Err(e) => {
            discard_images(&state, &image_urls).await;
            return Err(ApiError::Internal(e));
        }
    };

    Ok(Json(json!({ "message": "Part updated successfully", "part": part })))
}

/// PUT /api/shopkeeper/mark-sold/:id
pub async fn mark_sold(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    owned_part(&state, id, current.user.id).await?;
    state.part_repository.mark_sold(id).await?;
    Ok(Json(json!({ "message": "Part marked as sold" })))
}

/// DELETE /api/shopkeeper/delete-part/:id
///
/// Soft delete: the part transitions to `sold` and drops out of customer
/// listings, but stays in the shopkeeper's history.
pub async fn delete_part(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    owned_part(&state, id, current.user.id).await?;
    state.part_repository.mark_sold(id).await?;
    Ok(Json(json!({ "message": "Part deleted successfully" })))
}
