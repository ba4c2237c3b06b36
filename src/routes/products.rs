use actix_web::{HttpResponse, Responder, delete, get, post, put, web};

use crate::forms::products::ProductForm;
use crate::identity::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::service_error_response;
use crate::services::products::{self as products_service, ProductsQuery};

#[get("/products")]
pub async fn list_products(
    params: web::Query<ProductsQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match products_service::list_products(repo.get_ref(), params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => service_error_response(err, "list products"),
    }
}

#[post("/products")]
pub async fn create_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<ProductForm>,
) -> impl Responder {
    match products_service::create_product(repo.get_ref(), &user, form.into_inner()) {
        Ok(product) => HttpResponse::Created().json(product),
        Err(err) => service_error_response(err, "create product"),
    }
}

#[get("/products/{product_id}")]
pub async fn get_product(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match products_service::get_product(repo.get_ref(), path.into_inner()) {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) => service_error_response(err, "read product"),
    }
}

#[put("/products/{product_id}")]
pub async fn update_product(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<ProductForm>,
) -> impl Responder {
    let product_id = path.into_inner();

    match products_service::update_product(repo.get_ref(), &user, product_id, form.into_inner()) {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) => service_error_response(err, &format!("update product {product_id}")),
    }
}

#[delete("/products/{product_id}")]
pub async fn delete_product(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let product_id = path.into_inner();

    match products_service::delete_product(repo.get_ref(), &user, product_id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => service_error_response(err, &format!("delete product {product_id}")),
    }
}
