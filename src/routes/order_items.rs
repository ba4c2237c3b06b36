use actix_web::http::header::ALLOW;
use actix_web::{HttpResponse, Responder, get, post, web};
use serde_json::json;

use crate::identity::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::service_error_response;
use crate::services::orders::{self as orders_service, OrderItemsQuery};

#[get("/order-items")]
pub async fn list_order_items(
    params: web::Query<OrderItemsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match orders_service::list_order_items(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => service_error_response(err, "list order items"),
    }
}

/// Order items only come into existence by placing an order.
#[post("/order-items")]
pub async fn create_order_item(_user: AuthenticatedUser) -> impl Responder {
    HttpResponse::MethodNotAllowed()
        .insert_header((ALLOW, "GET"))
        .json(json!({
            "error": "method_not_allowed",
            "detail": "Order items are created by placing an order.",
        }))
}
