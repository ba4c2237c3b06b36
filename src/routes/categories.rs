use actix_web::{HttpResponse, Responder, delete, get, post, put, web};

use crate::forms::categories::CategoryForm;
use crate::identity::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::service_error_response;
use crate::services::categories::{self as categories_service, CategoriesQuery};

#[get("/categories")]
pub async fn list_categories(
    params: web::Query<CategoriesQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match categories_service::list_categories(repo.get_ref(), params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => service_error_response(err, "list categories"),
    }
}

#[post("/categories")]
pub async fn create_category(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<CategoryForm>,
) -> impl Responder {
    match categories_service::create_category(repo.get_ref(), &user, form.into_inner()) {
        Ok(category) => HttpResponse::Created().json(category),
        Err(err) => service_error_response(err, "create category"),
    }
}

#[get("/categories/{category_id}")]
pub async fn get_category(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match categories_service::get_category(repo.get_ref(), path.into_inner()) {
        Ok(category) => HttpResponse::Ok().json(category),
        Err(err) => service_error_response(err, "read category"),
    }
}

#[put("/categories/{category_id}")]
pub async fn update_category(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<CategoryForm>,
) -> impl Responder {
    let category_id = path.into_inner();

    match categories_service::update_category(
        repo.get_ref(),
        &user,
        category_id,
        form.into_inner(),
    ) {
        Ok(category) => HttpResponse::Ok().json(category),
        Err(err) => service_error_response(err, &format!("update category {category_id}")),
    }
}

#[delete("/categories/{category_id}")]
pub async fn delete_category(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let category_id = path.into_inner();

    match categories_service::delete_category(repo.get_ref(), &user, category_id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => service_error_response(err, &format!("delete category {category_id}")),
    }
}
