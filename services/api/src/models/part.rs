//! Part listings: entity, filter vocabulary, pagination, and view models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::catalog::CompanyRef;
use super::user::ShopDetails;

/// Physical condition of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "part_condition", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
    Refurbished,
}

impl Condition {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Condition::New),
            "used" => Some(Condition::Used),
            "refurbished" => Some(Condition::Refurbished),
            _ => None,
        }
    }
}

impl std::str::FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid condition: {s}"))
    }
}

/// Sale lifecycle of a part. A part is never hard-deleted; "deleting" it
/// moves it to `sold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "part_availability", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Sold,
    Reserved,
}

impl Availability {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Availability::Available),
            "sold" => Some(Availability::Sold),
            "reserved" => Some(Availability::Reserved),
            _ => None,
        }
    }
}

impl std::str::FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid availability: {s}"))
    }
}

/// Treat an empty or blank query value as an absent filter. The existing
/// clients send every filter key on every request (`?search=&company=`),
/// so `""` must not reach `Uuid::parse_str` and fail the whole request.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// One shared filter vocabulary for admin, shopkeeper, and customer
/// listings. Field names match the existing clients' query strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartQuery {
    /// Page number (1-based)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    /// Number of items per page
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<u32>,
    /// Case-insensitive substring over name and description
    pub search: Option<String>,
    /// Filter by car company id
    #[serde(default, deserialize_with = "blank_as_none")]
    pub company: Option<Uuid>,
    /// Filter by car model id
    #[serde(default, deserialize_with = "blank_as_none")]
    pub model: Option<Uuid>,
    /// Filter by category id
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<Uuid>,
    /// Filter by condition
    #[serde(default, deserialize_with = "blank_as_none")]
    pub condition: Option<Condition>,
    /// Filter by availability (shopkeeper scope only; the customer scope
    /// pins it to `available`)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub availability: Option<Availability>,
    /// Lower price bound, inclusive
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min_price: Option<f64>,
    /// Upper price bound, inclusive
    #[serde(default, deserialize_with = "blank_as_none")]
    pub max_price: Option<f64>,
    /// Case-insensitive substring over the denormalized location city
    pub city: Option<String>,
    /// Case-insensitive substring over the denormalized location state
    pub state: Option<String>,
    /// Filter by owning shopkeeper (honored in the admin scope only)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub shopkeeper: Option<Uuid>,
    /// Sort field
    pub sort_by: Option<String>,
    /// Sort direction (asc or desc)
    pub sort_order: Option<String>,
}

/// Resolved, clamped pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Upper bound on the page size; the wire accepts anything, the query
    /// never exceeds this.
    pub const MAX_LIMIT: u32 = 100;

    pub fn resolve(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(default_limit)
            .clamp(1, Self::MAX_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    /// `ceil(total / limit)`
    pub fn total_pages(&self, total: i64) -> u32 {
        if total <= 0 {
            return 0;
        }
        let limit = self.limit as i64;
        ((total + limit - 1) / limit) as u32
    }

    pub fn has_more(&self, total: i64) -> bool {
        (self.page as i64) * (self.limit as i64) < total
    }
}

/// Whitelisted sort fields; anything else falls back to creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartSort {
    CreatedAt,
    SellingPrice,
    Name,
    Year,
}

impl PartSort {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("sellingPrice") | Some("price") => PartSort::SellingPrice,
            Some("name") => PartSort::Name,
            Some("year") => PartSort::Year,
            _ => PartSort::CreatedAt,
        }
    }

    /// Column reference in the listing query; never interpolate raw client
    /// input into ORDER BY.
    pub fn column(self) -> &'static str {
        match self {
            PartSort::CreatedAt => "p.created_at",
            PartSort::SellingPrice => "p.selling_price",
            PartSort::Name => "p.name",
            PartSort::Year => "m.year",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Model reference embedded in part views
#[derive(Debug, Clone, Serialize)]
pub struct ModelRef {
    pub name: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// Category reference embedded in part views
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Owner summary embedded in part views
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopkeeperRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_details: Option<ShopDetails>,
}

/// Part view returned by every listing and detail endpoint: the row
/// enriched with company/model/category names, image URLs, and the owner
/// summary, built once at the boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub selling_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_price: Option<f64>,
    pub condition: Condition,
    pub availability: Availability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
    pub images: Vec<String>,
    pub car_company: CompanyRef,
    pub car_model: ModelRef,
    pub category: CategoryRef,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub shopkeeper: ShopkeeperRef,
    pub created_at: DateTime<Utc>,
}

/// Paginated listing response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartListResponse {
    pub parts: Vec<PartView>,
    pub total: i64,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

impl PartListResponse {
    pub fn new(parts: Vec<PartView>, total: i64, pagination: Pagination) -> Self {
        Self {
            parts,
            total,
            current_page: pagination.page,
            total_pages: pagination.total_pages(total),
            has_more: pagination.has_more(total),
        }
    }
}

/// New part handed to the repository
#[derive(Debug, Clone)]
pub struct NewPart {
    pub name: String,
    pub description: Option<String>,
    pub selling_price: f64,
    pub purchased_price: Option<f64>,
    pub condition: Condition,
    pub warranty: Option<String>,
    pub company_id: Uuid,
    pub model_id: Uuid,
    pub category_id: Uuid,
    pub shopkeeper_id: Uuid,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub location_pincode: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub images: Vec<String>,
}

/// Partial part update; absent fields keep their value
#[derive(Debug, Clone, Default)]
pub struct PartUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub selling_price: Option<f64>,
    pub purchased_price: Option<f64>,
    pub condition: Option<Condition>,
    pub availability: Option<Availability>,
    pub warranty: Option<String>,
    pub company_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl PartUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.selling_price.is_none()
            && self.purchased_price.is_none()
            && self.condition.is_none()
            && self.availability.is_none()
            && self.warranty.is_none()
            && self.company_id.is_none()
            && self.model_id.is_none()
            && self.category_id.is_none()
    }
}

/// Per-availability part counts for the shopkeeper dashboard
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShopkeeperStats {
    pub total_parts: i64,
    pub available_parts: i64,
    pub sold_parts: i64,
    pub reserved_parts: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let pg = Pagination::resolve(None, None, 12);
        assert_eq!(pg, Pagination { page: 1, limit: 12 });

        let pg = Pagination::resolve(Some(0), Some(0), 12);
        assert_eq!(pg, Pagination { page: 1, limit: 1 });

        let pg = Pagination::resolve(Some(3), Some(100_000), 12);
        assert_eq!(
            pg,
            Pagination {
                page: 3,
                limit: Pagination::MAX_LIMIT
            }
        );
        assert_eq!(pg.offset(), 200);
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        let pg = Pagination { page: 1, limit: 10 };
        assert_eq!(pg.total_pages(0), 0);
        assert_eq!(pg.total_pages(1), 1);
        assert_eq!(pg.total_pages(10), 1);
        assert_eq!(pg.total_pages(11), 2);
        assert_eq!(pg.total_pages(95), 10);
    }

    #[test]
    fn has_more_tracks_remaining_rows() {
        let pg = Pagination { page: 2, limit: 10 };
        assert!(pg.has_more(21));
        assert!(!pg.has_more(20));
    }

    #[test]
    fn sort_params_are_whitelisted() {
        assert_eq!(PartSort::from_param(Some("sellingPrice")), PartSort::SellingPrice);
        assert_eq!(PartSort::from_param(Some("name")), PartSort::Name);
        assert_eq!(PartSort::from_param(Some("year")), PartSort::Year);
        assert_eq!(PartSort::from_param(Some("createdAt")), PartSort::CreatedAt);
        // arbitrary input cannot reach ORDER BY
        assert_eq!(
            PartSort::from_param(Some("id; DROP TABLE parts")),
            PartSort::CreatedAt
        );
        assert_eq!(PartSort::from_param(None), PartSort::CreatedAt);

        assert_eq!(SortOrder::from_param(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::from_param(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::from_param(Some("sideways")), SortOrder::Desc);
    }

    #[test]
    fn blank_filter_params_are_treated_as_absent() {
        // The dashboard sends every filter key on its first load, all empty
        let uri: axum::http::Uri =
            "/search-parts?search=&company=&model=&category=&condition=&availability=&minPrice=&maxPrice=&page=&limit="
                .parse()
                .unwrap();
        let axum::extract::Query(query) =
            axum::extract::Query::<PartQuery>::try_from_uri(&uri).unwrap();

        assert_eq!(query.search.as_deref(), Some(""));
        assert!(query.company.is_none());
        assert!(query.model.is_none());
        assert!(query.category.is_none());
        assert!(query.condition.is_none());
        assert!(query.availability.is_none());
        assert!(query.min_price.is_none());
        assert!(query.max_price.is_none());
        assert!(query.page.is_none());
        assert!(query.limit.is_none());
    }

    #[test]
    fn populated_filter_params_still_parse() {
        let id = Uuid::new_v4();
        let uri: axum::http::Uri =
            format!("/search-parts?company={id}&condition=used&minPrice=100.5&page=2")
                .parse()
                .unwrap();
        let axum::extract::Query(query) =
            axum::extract::Query::<PartQuery>::try_from_uri(&uri).unwrap();

        assert_eq!(query.company, Some(id));
        assert_eq!(query.condition, Some(Condition::Used));
        assert_eq!(query.min_price, Some(100.5));
        assert_eq!(query.page, Some(2));
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(PartUpdate::default().is_empty());
        let upd = PartUpdate {
            selling_price: Some(1500.0),
            ..Default::default()
        };
        assert!(!upd.is_empty());
    }
}
