//! Marketplace models

pub mod catalog;
pub mod part;
pub mod user;

// Re-export for convenience
pub use catalog::{
    CarCompany, CarModel, CarModelView, CompanyRef, CreateCategoryRequest, CreateCompanyRequest,
    CreateModelRequest, PartCategory, Suggestion, SuggestionKind,
};
pub use part::{
    Availability, CategoryRef, Condition, ModelRef, NewPart, Pagination, PartListResponse,
    PartQuery, PartSort, PartUpdate, PartView, ShopkeeperRef, ShopkeeperStats, SortOrder,
};
pub use user::{
    AccountStatus, NewUser, ReviewError, Role, ShopDetails, ShopkeeperProfile, User, UserView,
    review_transition,
};
