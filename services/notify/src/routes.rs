//! Contact-form endpoint

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::AppState;

/// Incoming part request from the contact form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub car_make: String,
    #[serde(default)]
    pub car_model: String,
    #[serde(default)]
    pub car_year: String,
    #[serde(default)]
    pub part_name: String,
    pub part_number: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to send email")]
    Mail(#[from] anyhow::Error),
}

impl IntoResponse for NotifyError {
    fn into_response(self) -> Response {
        let status = match &self {
            NotifyError::Validation(_) => StatusCode::BAD_REQUEST,
            NotifyError::Mail(err) => {
                tracing::error!("mail delivery failed: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "success": false, "message": self.to_string() }));
        (status, body).into_response()
    }
}

fn validate(request: &ContactRequest) -> Result<(), NotifyError> {
    let required = [
        ("Name", &request.name),
        ("Email", &request.email),
        ("Phone", &request.phone),
        ("Car make", &request.car_make),
        ("Car model", &request.car_model),
        ("Car year", &request.car_year),
        ("Part name", &request.part_name),
    ];

    for (label, value) in required {
        if value.trim().is_empty() {
            return Err(NotifyError::Validation(format!("{label} is required")));
        }
    }

    if !request.email.contains('@') {
        return Err(NotifyError::Validation(
            "Please enter a valid email".to_string(),
        ));
    }

    Ok(())
}

/// POST /api/contact
async fn contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<Value>, NotifyError> {
    validate(&request)?;

    state.mailer.send_part_request(&request).await?;
    info!("Part request relayed for {}", request.email);

    // The business copy is the one that matters; a failed confirmation
    // must not fail the request.
    if let Err(e) = state.mailer.send_confirmation(&request).await {
        warn!("confirmation email failed for {}: {e:#}", request.email);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Your part request has been sent. We will get back to you shortly.",
    })))
}

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Build the notification router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/contact", post(contact))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> ContactRequest {
        ContactRequest {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: "9999999999".into(),
            car_make: "Maruti".into(),
            car_model: "Swift".into(),
            car_year: "2018".into(),
            part_name: "Brake pad".into(),
            part_number: None,
            message: None,
        }
    }

    #[test]
    fn complete_request_passes() {
        assert!(validate(&full_request()).is_ok());
    }

    #[test]
    fn each_required_field_is_enforced() {
        let blank = |f: fn(&mut ContactRequest)| {
            let mut r = full_request();
            f(&mut r);
            validate(&r)
        };

        assert!(blank(|r| r.name.clear()).is_err());
        assert!(blank(|r| r.email.clear()).is_err());
        assert!(blank(|r| r.phone = "   ".into()).is_err());
        assert!(blank(|r| r.car_make.clear()).is_err());
        assert!(blank(|r| r.car_model.clear()).is_err());
        assert!(blank(|r| r.car_year.clear()).is_err());
        assert!(blank(|r| r.part_name.clear()).is_err());
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let raw = json!({
            "name": "Asha",
            "email": "asha@example.com",
            "phone": "9999999999",
            "carMake": "Maruti",
            "carModel": "Swift",
            "carYear": "2018",
            "partName": "Brake pad"
        });
        let request: ContactRequest = serde_json::from_value(raw).unwrap();
        assert!(validate(&request).is_ok());
        assert!(request.part_number.is_none());
    }

    #[test]
    fn bad_email_is_rejected() {
        let mut r = full_request();
        r.email = "not-an-email".into();
        assert!(validate(&r).is_err());
    }
}
