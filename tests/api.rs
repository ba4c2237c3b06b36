use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use actix_web::{App, test, web};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};

use pushkind_store::identity::Auth0Gateway;
use pushkind_store::identity::jwt::JwtVerifier;
use pushkind_store::repository::DieselRepository;
use pushkind_store::routes;

mod common;

const SECRET: &str = "api-test-secret";
const ROLES_CLAIM: &str = "https://pushkind.store/roles";

fn token(sub: &str, roles: &[&str], expires_in: i64) -> String {
    encode(
        &Header::default(),
        &json!({
            "sub": sub,
            "exp": Utc::now().timestamp() + expires_in,
            ROLES_CLAIM: roles,
        }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("token should encode")
}

fn bearer(sub: &str, roles: &[&str]) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token(sub, roles, 600)))
}

macro_rules! test_app {
    ($test_db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(DieselRepository::new($test_db.pool())))
                .app_data(web::Data::new(Auth0Gateway::new(
                    JwtVerifier::from_secret(SECRET, None, None),
                    ROLES_CLAIM,
                )))
                .service(web::scope("/api/v1").configure(routes::configure))
                .configure(routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_missing_authorization_is_not_authenticated() {
    let test_db = common::TestDb::new("test_api_missing_authorization.db");
    let app = test_app!(test_db);

    let req = test::TestRequest::get().uri("/orders").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(WWW_AUTHENTICATE));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_authenticated");
}

#[actix_web::test]
async fn test_expired_token_fails_authentication() {
    let test_db = common::TestDb::new("test_api_expired_token.db");
    let app = test_app!(test_db);

    let req = test::TestRequest::get()
        .uri("/api/v1/orders")
        .insert_header((
            AUTHORIZATION,
            format!("Bearer {}", token("auth0|1", &[], -3600)),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "authentication_failed");
    assert_eq!(body["detail"], "Token is expired");
}

#[actix_web::test]
async fn test_malformed_authorization_fails_authentication() {
    let test_db = common::TestDb::new("test_api_malformed_authorization.db");
    let app = test_app!(test_db);

    for header in ["Token abc", "Bearer", "Bearer a b"] {
        let req = test::TestRequest::get()
            .uri("/orders")
            .insert_header((AUTHORIZATION, header))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "header: {header}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "authentication_failed");
    }
}

#[actix_web::test]
async fn test_catalog_reads_are_public_and_writes_need_admin() {
    let test_db = common::TestDb::new("test_api_catalog.db");
    let app = test_app!(test_db);
    let payload = json!({ "name": "Books", "image": "https://cdn.example.com/books.png" });

    let req = test::TestRequest::post()
        .uri("/categories")
        .insert_header(bearer("auth0|buyer", &[]))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/categories")
        .insert_header(bearer("auth0|admin", &["admin"]))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let category: Value = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri("/categories")
        .insert_header(bearer("auth0|admin", &["admin"]))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get().uri("/categories").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "Books");

    let req = test::TestRequest::post()
        .uri("/api/v1/products")
        .insert_header(bearer("auth0|admin", &["admin"]))
        .set_json(json!({
            "category": category["id"],
            "name": "Atlas",
            "price": "0.00",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["fields"]["price"].is_array());

    let req = test::TestRequest::get().uri("/products/9999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_far_pages_are_empty() {
    let test_db = common::TestDb::new("test_api_far_pages.db");
    let repo = DieselRepository::new(test_db.pool());
    let category = common::seed_category(&repo, "Books");
    common::seed_product(&repo, category.id, "Atlas", 1000, 1);
    let app = test_app!(test_db);

    let req = test::TestRequest::get()
        .uri("/products?page=18446744073709551615")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn test_get_or_create_returns_the_same_cart() {
    let test_db = common::TestDb::new("test_api_get_or_create.db");
    let app = test_app!(test_db);

    let mut ids = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/cart/get-or-create")
            .insert_header(("X-Session-Key", "anon-42"))
            .to_request();
        let cart: Value = test::call_and_read_body_json(&app, req).await;
        ids.push(cart["id"].clone());
    }

    assert_eq!(ids[0], ids[1]);

    let req = test::TestRequest::post()
        .uri("/cart")
        .insert_header(bearer("auth0|shopper", &[]))
        .to_request();
    let cart: Value = test::call_and_read_body_json(&app, req).await;
    assert_ne!(cart["id"], ids[0]);
}

#[actix_web::test]
async fn test_checkout_flow() {
    let test_db = common::TestDb::new("test_api_checkout_flow.db");
    let repo = DieselRepository::new(test_db.pool());
    let category = common::seed_category(&repo, "Stationery");
    let notebook = common::seed_product(&repo, category.id, "Notebook", 1000, 5);
    let pen = common::seed_product(&repo, category.id, "Pen", 500, 5);
    let app = test_app!(test_db);

    for (product_id, quantity) in [(notebook.id, 1), (notebook.id, 1), (pen.id, 1)] {
        let req = test::TestRequest::post()
            .uri("/cart-items")
            .insert_header(bearer("auth0|buyer", &[]))
            .set_json(json!({ "product_id": product_id, "quantity": quantity }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/cart-items")
        .insert_header(bearer("auth0|buyer", &[]))
        .to_request();
    let items: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(items.as_array().map(Vec::len), Some(2));

    let req = test::TestRequest::post()
        .uri("/orders")
        .insert_header(bearer("auth0|buyer", &[]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = test::read_body_json(resp).await;
    assert_eq!(order["total_amount"], "25.00");
    assert_eq!(order["items"].as_array().map(Vec::len), Some(2));

    let req = test::TestRequest::post()
        .uri("/orders")
        .insert_header(bearer("auth0|buyer", &[]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{}", order["id"]))
        .insert_header(bearer("auth0|someone-else", &[]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/order-items")
        .insert_header(bearer("auth0|buyer", &[]))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 2);

    let req = test::TestRequest::post()
        .uri("/order-items")
        .insert_header(bearer("auth0|buyer", &[]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn test_health_is_public() {
    let test_db = common::TestDb::new("test_api_health.db");
    let app = test_app!(test_db);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}
