pub mod db;
pub mod domain;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod schema;
pub mod services;

/// Role required for administrative operations (catalog management,
/// approvals, list lifecycle).
pub const SERVICE_ACCESS_ROLE: &str = "admin";
