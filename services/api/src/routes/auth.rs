//! Registration, login, and the current-user endpoint

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::{AccountStatus, NewUser, Role, ShopDetails, UserView};
use crate::state::AppState;
use crate::validation::{
    validate_email, validate_password, validate_phone, validate_pincode, validate_required,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub shop_details: Option<ShopDetails>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn validate_shop_details(shop: &ShopDetails) -> ApiResult<()> {
    validate_required("Shop name", &shop.shop_name).map_err(ApiError::Validation)?;
    validate_required("Address", &shop.address).map_err(ApiError::Validation)?;
    validate_required("City", &shop.city).map_err(ApiError::Validation)?;
    validate_required("State", &shop.state).map_err(ApiError::Validation)?;
    validate_pincode(&shop.pincode).map_err(ApiError::Validation)?;
    Ok(())
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_required("Name", &request.name).map_err(ApiError::Validation)?;
    validate_email(&request.email).map_err(ApiError::Validation)?;
    validate_password(&request.password).map_err(ApiError::Validation)?;
    validate_phone(&request.phone).map_err(ApiError::Validation)?;

    let role = request.role.unwrap_or(Role::Customer);
    if role == Role::Admin {
        return Err(ApiError::Validation("Invalid role".to_string()));
    }

    let email = request.email.trim().to_ascii_lowercase();
    if state.user_repository.find_by_email(&email).await?.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let new_user = NewUser {
        name: request.name.trim().to_string(),
        email,
        password: request.password,
        phone: request.phone.trim().to_string(),
    };

    let (user, profile, message) = match role {
        Role::Shopkeeper => {
            let shop = request.shop_details.ok_or_else(|| {
                ApiError::Validation("Shop details are required for shopkeepers".to_string())
            })?;
            validate_shop_details(&shop)?;

            let (user, profile) = state.user_repository.create_shopkeeper(&new_user, &shop).await?;
            (
                user,
                Some(profile),
                "Registration successful! Your account is pending admin approval.",
            )
        }
        _ => {
            let user = state.user_repository.create_customer(&new_user).await?;
            (user, None, "Registration successful!")
        }
    };

    info!("Registered {} account {}", user.role.as_str(), user.email);

    let token = state.jwt_service.generate_token(user.id)?;
    let view = UserView::from_parts(user, profile);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": message, "token": token, "user": view })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let email = request.email.trim().to_ascii_lowercase();

    let user = state
        .user_repository
        .find_by_email(&email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !state.user_repository.verify_password(&user, &request.password)? {
        info!("Failed login attempt for {}", email);
        return Err(ApiError::InvalidCredentials);
    }

    if user.role == Role::Shopkeeper && user.status != AccountStatus::Approved {
        return Err(ApiError::AccountNotApproved(user.status));
    }

    let profile = if user.role == Role::Shopkeeper {
        state.user_repository.profile_of(user.id).await?
    } else {
        None
    };

    let token = state.jwt_service.generate_token(user.id)?;
    let view = UserView::from_parts(user, profile);

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": view,
    })))
}

/// GET /api/auth/me
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<Value> {
    let view = UserView::from_parts(current.user, current.profile);
    Json(json!({ "user": view }))
}
