//! Email notification service for part requests
//!
//! Stateless front for the contact form: one POST endpoint that relays a
//! part request to the business inbox and sends the submitter a
//! confirmation. Nothing is persisted.

mod mailer;
mod routes;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::mailer::Mailer;
use crate::routes::create_router;

#[derive(Clone)]
pub struct AppState {
    pub mailer: Arc<Mailer>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("Starting notification service");

    let mailer = Mailer::from_env()?;
    let state = AppState {
        mailer: Arc::new(mailer),
    };

    let app = create_router(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "5001".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Notification service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
