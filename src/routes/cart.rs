use actix_web::{HttpResponse, Responder, get, post, web};

use crate::domain::cart::CartOwner;
use crate::repository::DieselRepository;
use crate::routes::service_error_response;
use crate::services::cart as cart_service;

#[get("/cart")]
pub async fn get_cart(owner: CartOwner, repo: web::Data<DieselRepository>) -> impl Responder {
    match cart_service::get_cart(repo.get_ref(), &owner) {
        Ok(cart) => HttpResponse::Ok().json(cart),
        Err(err) => service_error_response(err, &format!("read cart of {owner}")),
    }
}

#[post("/cart")]
pub async fn create_cart(owner: CartOwner, repo: web::Data<DieselRepository>) -> impl Responder {
    get_or_create_response(&owner, &repo)
}

#[get("/cart/get-or-create")]
pub async fn get_or_create_cart(
    owner: CartOwner,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    get_or_create_response(&owner, &repo)
}

fn get_or_create_response(owner: &CartOwner, repo: &DieselRepository) -> HttpResponse {
    match cart_service::get_or_create_cart(repo, owner) {
        Ok(cart) => HttpResponse::Ok().json(cart),
        Err(err) => service_error_response(err, &format!("open cart for {owner}")),
    }
}
