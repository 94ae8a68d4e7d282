//! Diesel/PostgreSQL persistence adapters.

mod diesel_catalog_repository;
mod diesel_complaint_repository;
mod diesel_errors;
mod diesel_notification_repository;
mod diesel_reading_repository;
mod diesel_user_repository;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_catalog_repository::DieselCatalogRepository;
pub use diesel_complaint_repository::DieselComplaintRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_reading_repository::DieselReadingRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
