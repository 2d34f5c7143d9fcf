//! Reference-data entities: car companies, car models, part categories
//!
//! Reference data is admin-managed and soft-deactivated via `is_active`,
//! never hard-deleted once a part references it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Car manufacturer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CarCompany {
    pub id: Uuid,
    pub name: String,
    pub logo: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Car model, belongs to one company
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CarModel {
    pub id: Uuid,
    pub name: String,
    pub year: i32,
    pub variant: Option<String>,
    pub company_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Car model enriched with its company name
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarModelView {
    pub id: Uuid,
    pub name: String,
    pub year: i32,
    pub variant: Option<String>,
    pub company: CompanyRef,
    pub is_active: bool,
}

/// Part category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PartCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Company reference embedded in views
#[derive(Debug, Clone, Serialize)]
pub struct CompanyRef {
    pub name: String,
}

/// Request to create a car company
#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub logo: Option<String>,
}

/// Request to create a car model
#[derive(Debug, Deserialize)]
pub struct CreateModelRequest {
    pub name: String,
    pub year: i32,
    pub variant: Option<String>,
    pub company: Uuid,
}

/// Request to create a part category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Typed search suggestion for the public suggestion endpoint
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub name: String,
    pub id: Uuid,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Company,
    Model,
    Category,
}
