//! Shared application state

use sqlx::PgPool;

use crate::jwt::JwtService;
use crate::repositories::{CatalogRepository, PartRepository, UserRepository};
use crate::uploads::ImageStore;

/// Application state shared across request handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub catalog_repository: CatalogRepository,
    pub part_repository: PartRepository,
    pub image_store: ImageStore,
}

impl AppState {
    pub fn new(db_pool: PgPool, jwt_service: JwtService, image_store: ImageStore) -> Self {
        Self {
            jwt_service,
            image_store,
            user_repository: UserRepository::new(db_pool.clone()),
            catalog_repository: CatalogRepository::new(db_pool.clone()),
            part_repository: PartRepository::new(db_pool.clone()),
            db_pool,
        }
    }
}
