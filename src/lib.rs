pub mod config;
pub mod db;
pub mod domain;
pub mod forms;
pub mod identity;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

/// Role required for catalog writes and for reading other users' orders.
pub const SERVICE_ACCESS_ROLE: &str = "admin";
