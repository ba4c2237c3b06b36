use actix_web::{HttpResponse, Responder, delete, get, post, put, web};

use crate::domain::cart::CartOwner;
use crate::forms::cart::{AddCartItemForm, UpdateCartItemForm};
use crate::repository::DieselRepository;
use crate::routes::service_error_response;
use crate::services::cart as cart_service;

#[get("/cart-items")]
pub async fn list_cart_items(
    owner: CartOwner,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match cart_service::list_cart_items(repo.get_ref(), &owner) {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(err) => service_error_response(err, "list cart items"),
    }
}

#[post("/cart-items")]
pub async fn add_cart_item(
    owner: CartOwner,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddCartItemForm>,
) -> impl Responder {
    match cart_service::add_item(repo.get_ref(), &owner, form.into_inner()) {
        Ok(item) => HttpResponse::Created().json(item),
        Err(err) => service_error_response(err, &format!("add item to cart of {owner}")),
    }
}

#[put("/cart-items/{item_id}")]
pub async fn update_cart_item(
    path: web::Path<i32>,
    owner: CartOwner,
    repo: web::Data<DieselRepository>,
    form: web::Json<UpdateCartItemForm>,
) -> impl Responder {
    let item_id = path.into_inner();

    match cart_service::update_item_quantity(repo.get_ref(), &owner, item_id, form.into_inner()) {
        Ok(item) => HttpResponse::Ok().json(item),
        Err(err) => service_error_response(err, &format!("update cart item {item_id}")),
    }
}

#[delete("/cart-items/{item_id}")]
pub async fn remove_cart_item(
    path: web::Path<i32>,
    owner: CartOwner,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let item_id = path.into_inner();

    match cart_service::remove_item(repo.get_ref(), &owner, item_id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => service_error_response(err, &format!("remove cart item {item_id}")),
    }
}
