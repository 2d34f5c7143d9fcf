//! Custom error types for the marketplace API

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::{AccountStatus, ReviewError};

/// Request-level error taxonomy. Every handler catches at this boundary
/// and the client always receives a JSON `{message}` body.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Registration against an email that already has an account
    #[error("User already exists with this email")]
    DuplicateEmail,

    /// Reference-data name collision
    #[error("{0} already exists")]
    Duplicate(&'static str),

    /// Unknown email or wrong password; indistinguishable on the wire
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Admin review decision the account lifecycle refuses
    #[error("{0}")]
    InvalidReview(#[from] ReviewError),

    /// Missing, invalid, or expired bearer token
    #[error("Token is not valid")]
    Unauthenticated,

    /// Shopkeeper whose account is not (or no longer) approved
    #[error("{}", not_approved_message(*.0))]
    AccountNotApproved(AccountStatus),

    /// Authenticated but the route group requires another role
    #[error("{0}")]
    Forbidden(&'static str),

    /// Unresolvable id
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Storage or other unexpected failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn not_approved_message(status: AccountStatus) -> &'static str {
    match status {
        AccountStatus::Pending => "Your account is pending approval",
        AccountStatus::Rejected => "Your account has been rejected",
        AccountStatus::Approved => "Account not approved yet.",
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateEmail
            | ApiError::Duplicate(_)
            | ApiError::InvalidCredentials
            | ApiError::InvalidReview(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::AccountNotApproved(_) | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                "Server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "message": message }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Validation("Name is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::DuplicateEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::AccountNotApproved(AccountStatus::Pending).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Forbidden("Access denied. Admin only.").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::NotFound("Part").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_approved_message_distinguishes_pending_from_rejected() {
        assert_eq!(
            ApiError::AccountNotApproved(AccountStatus::Pending).to_string(),
            "Your account is pending approval"
        );
        assert_eq!(
            ApiError::AccountNotApproved(AccountStatus::Rejected).to_string(),
            "Your account has been rejected"
        );
    }
}
