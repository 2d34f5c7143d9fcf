//! Request authentication and role gates
//!
//! `authenticate` resolves the bearer token to a live user row on every
//! request; the role gates then read the resolved user from request
//! extensions. Gates assume `authenticate` already ran on the route.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::error::ApiError;
use crate::models::{AccountStatus, Role, ShopkeeperProfile, User};
use crate::state::AppState;

/// The authenticated caller, attached to request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub profile: Option<ShopkeeperProfile>,
}

/// Resolve the `Authorization: Bearer` token to a user
pub async fn authenticate(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(bearer) = bearer.ok_or(ApiError::Unauthenticated)?;

    let claims = state
        .jwt_service
        .validate_token(bearer.token())
        .map_err(|_| ApiError::Unauthenticated)?;

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let profile = if user.role == Role::Shopkeeper {
        state.user_repository.profile_of(user.id).await?
    } else {
        None
    };

    request.extensions_mut().insert(CurrentUser { user, profile });

    Ok(next.run(request).await)
}

fn current_user(request: &Request) -> Result<&CurrentUser, ApiError> {
    request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(ApiError::Unauthenticated)
}

/// Admit admins only
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let current = current_user(&request)?;
    if current.user.role != Role::Admin {
        return Err(ApiError::Forbidden("Access denied. Admin only."));
    }
    Ok(next.run(request).await)
}

/// Admit approved shopkeepers only. Pending and rejected shopkeepers get
/// a 403 carrying their review state.
pub async fn require_approved_shopkeeper(
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = current_user(&request)?;
    if current.user.role != Role::Shopkeeper {
        return Err(ApiError::Forbidden("Access denied. Shopkeeper only."));
    }
    if current.user.status != AccountStatus::Approved {
        return Err(ApiError::AccountNotApproved(current.user.status));
    }
    Ok(next.run(request).await)
}

/// Admit customers only
pub async fn require_customer(request: Request, next: Next) -> Result<Response, ApiError> {
    let current = current_user(&request)?;
    if current.user.role != Role::Customer {
        return Err(ApiError::Forbidden("Access denied. Customer only."));
    }
    Ok(next.run(request).await)
}
