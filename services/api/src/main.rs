//! Marketplace API service for automotive spare parts

mod error;
mod jwt;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;
mod uploads;
mod validation;

use anyhow::Result;
use tracing::{info, warn};

use common::database::{DatabaseConfig, health_check, init_pool};

use crate::jwt::{JwtConfig, JwtService};
use crate::routes::create_router;
use crate::state::AppState;
use crate::uploads::ImageStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("Starting marketplace API service");

    let db_config = DatabaseConfig::from_env()?;
    let db_pool = init_pool(&db_config).await?;
    health_check(&db_pool).await?;
    info!("Database connection established");

    sqlx::migrate!("./migrations").run(&db_pool).await?;
    info!("Database migrations applied");

    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(&jwt_config);
    let image_store = ImageStore::from_env()?;

    let state = AppState::new(db_pool, jwt_service, image_store);

    bootstrap_admin(&state).await?;

    let app = create_router(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Marketplace API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the admin account on first boot when `ADMIN_EMAIL` and
/// `ADMIN_PASSWORD` are configured
async fn bootstrap_admin(state: &AppState) -> Result<()> {
    let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap");
        return Ok(());
    };

    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string());
    let phone = std::env::var("ADMIN_PHONE").unwrap_or_else(|_| "0000000000".to_string());

    if state
        .user_repository
        .ensure_admin(&name, &email, &password, &phone)
        .await?
    {
        info!("Admin account created for {}", email);
    }

    Ok(())
}
