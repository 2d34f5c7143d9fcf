//! Common library for the CarFix Parts services
//!
//! This crate provides the database plumbing shared by the marketplace
//! services: PostgreSQL pool configuration, connectivity, and the
//! database error type.

pub mod database;
pub mod error;
