//! Router assembly for the marketplace API

pub mod admin;
pub mod auth;
pub mod customer;
pub mod parts;
pub mod shopkeeper;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    authenticate, require_admin, require_approved_shopkeeper, require_customer,
};
use crate::state::AppState;

// 5 images at 5MB each, plus headroom for the scalar fields
const MULTIPART_BODY_LIMIT: usize = 30 * 1024 * 1024;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(from_fn_with_state(state.clone(), authenticate)),
        );

    let parts_routes = Router::new()
        .route("/car-companies", get(parts::car_companies))
        .route("/car-models/:company_id", get(parts::car_models))
        .route("/categories", get(parts::categories))
        .route("/search-suggestions", get(parts::search_suggestions));

    let admin_routes = Router::new()
        .route("/pending-shopkeepers", get(admin::pending_shopkeepers))
        .route("/all-shopkeepers", get(admin::all_shopkeepers))
        .route("/approve-shopkeeper/:id", put(admin::approve_shopkeeper))
        .route("/shopkeeper/:id", get(admin::shopkeeper_detail))
        .route("/all-parts", get(admin::all_parts))
        .route("/dashboard-stats", get(admin::dashboard_stats))
        .route("/car-companies", post(admin::create_company))
        .route("/car-companies/:id", delete(admin::delete_company))
        .route("/car-models", post(admin::create_model))
        .route("/car-models/:id", delete(admin::delete_model))
        .route("/part-categories", post(admin::create_category))
        .route("/part-categories/:id", delete(admin::delete_category))
        .layer(from_fn(require_admin))
        .layer(from_fn_with_state(state.clone(), authenticate));

    let shopkeeper_routes = Router::new()
        .route("/dashboard-stats", get(shopkeeper::dashboard_stats))
        .route("/my-parts", get(shopkeeper::my_parts))
        .route("/add-part", post(shopkeeper::add_part))
        .route("/update-part/:id", put(shopkeeper::update_part))
        .route("/mark-sold/:id", put(shopkeeper::mark_sold))
        .route("/delete-part/:id", delete(shopkeeper::delete_part))
        .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT))
        .layer(from_fn(require_approved_shopkeeper))
        .layer(from_fn_with_state(state.clone(), authenticate));

    let customer_routes = Router::new()
        .route("/search-parts", get(customer::search_parts))
        .route("/part/:id", get(customer::part_detail))
        .route("/similar-parts/:id", get(customer::similar_parts))
        .route("/featured-parts", get(customer::featured_parts))
        .layer(from_fn(require_customer))
        .layer(from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes)
        .nest("/api/parts", parts_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/shopkeeper", shopkeeper_routes)
        .nest("/api/customer", customer_routes)
        .nest_service("/uploads", ServeDir::new(state.image_store.root()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
