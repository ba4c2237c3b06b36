use actix_web::{HttpResponse, Responder, get, post, web};

use crate::identity::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::service_error_response;
use crate::services::orders::{self as orders_service, OrdersQuery};

#[get("/orders")]
pub async fn list_orders(
    params: web::Query<OrdersQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match orders_service::list_orders(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => service_error_response(err, "list orders"),
    }
}

#[post("/orders")]
pub async fn place_order(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match orders_service::place_order(repo.get_ref(), &user) {
        Ok(order) => HttpResponse::Created().json(order),
        Err(err) => service_error_response(err, &format!("place order for {}", user.sub)),
    }
}

#[get("/orders/{order_id}")]
pub async fn get_order(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let order_id = path.into_inner();

    match orders_service::get_order(repo.get_ref(), &user, order_id) {
        Ok(order) => HttpResponse::Ok().json(order),
        Err(err) => service_error_response(err, &format!("read order {order_id}")),
    }
}
