pub mod cart;
pub mod catalog_import;
pub mod categories;
pub mod errors;
pub mod orders;
pub mod products;
pub mod user_roles;

pub use errors::{ServiceError, ServiceResult};
