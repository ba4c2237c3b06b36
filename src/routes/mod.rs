//! JSON endpoints. Every handler delegates to a service and maps
//! `ServiceError` to a status code.

use actix_web::error::InternalError;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::forms::field_error;
use crate::services::ServiceError;

pub mod cart;
pub mod cart_items;
pub mod categories;
pub mod health;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod user_roles;

/// Register every endpoint and the JSON/query error handlers on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        let response = bad_request(&err.to_string());
        InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        let response = bad_request(&err.to_string());
        InternalError::from_response(err, response).into()
    }))
    .service(health::health)
    .service(categories::list_categories)
    .service(categories::create_category)
    .service(categories::get_category)
    .service(categories::update_category)
    .service(categories::delete_category)
    .service(products::list_products)
    .service(products::create_product)
    .service(products::get_product)
    .service(products::update_product)
    .service(products::delete_product)
    .service(cart::get_cart)
    .service(cart::create_cart)
    .service(cart::get_or_create_cart)
    .service(cart_items::list_cart_items)
    .service(cart_items::add_cart_item)
    .service(cart_items::update_cart_item)
    .service(cart_items::remove_cart_item)
    .service(orders::list_orders)
    .service(orders::place_order)
    .service(orders::get_order)
    .service(order_items::list_order_items)
    .service(order_items::create_order_item)
    .service(user_roles::get_user_roles);
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "error": "validation_error",
        "fields": field_error("non_field_errors", message),
    }))
}

/// Render a service failure. Internal details are logged, never returned.
pub fn service_error_response(err: ServiceError, action: &str) -> HttpResponse {
    match err {
        ServiceError::Form(fields) => HttpResponse::BadRequest().json(json!({
            "error": "validation_error",
            "fields": fields,
        })),
        ServiceError::NotFound => HttpResponse::NotFound().json(json!({ "error": "not_found" })),
        ServiceError::Conflict(detail) => HttpResponse::Conflict().json(json!({
            "error": "conflict",
            "detail": detail,
        })),
        ServiceError::Unauthorized => {
            HttpResponse::Forbidden().json(json!({ "error": "permission_denied" }))
        }
        ServiceError::Upstream(detail) => {
            log::error!("Failed to {action}: {detail}");
            HttpResponse::BadGateway().json(json!({ "error": "upstream_error" }))
        }
        ServiceError::Internal(detail) => {
            log::error!("Failed to {action}: {detail}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
