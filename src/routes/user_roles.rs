use actix_web::{HttpResponse, Responder, get, web};

use crate::identity::{Auth0Gateway, AuthenticatedUser};
use crate::routes::service_error_response;
use crate::services::user_roles as user_roles_service;

#[get("/user-roles/{user_id}")]
pub async fn get_user_roles(
    path: web::Path<String>,
    user: AuthenticatedUser,
    gateway: web::Data<Auth0Gateway>,
) -> impl Responder {
    let user_id = path.into_inner();

    match user_roles_service::get_user_roles(gateway.get_ref(), &user, &user_id).await {
        Ok(roles) => HttpResponse::Ok().json(roles),
        Err(err) => service_error_response(err, &format!("read roles of {user_id}")),
    }
}
