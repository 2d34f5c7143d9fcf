//! Repositories for database access

pub mod catalog;
pub mod part;
pub mod user;

pub use catalog::CatalogRepository;
pub use part::{PartRepository, PartScope};
pub use user::UserRepository;
