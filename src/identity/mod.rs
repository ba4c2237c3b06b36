//! Bearer token verification and role lookups against the identity provider.

use std::future::Future;

use actix_web::http::StatusCode;
use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

pub mod auth0;
pub mod extract;
pub mod jwt;

pub use auth0::Auth0Gateway;
pub use extract::AuthenticatedUser;

/// Claims read from a verified access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject, the provider's user id such as `auth0|42`.
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Every other claim, including namespaced custom claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Role names stored under the custom claim `claim`.
    pub fn roles(&self, claim: &str) -> Vec<String> {
        match self.extra.get(claim) {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|value| value.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(value)) => vec![value.clone()],
            _ => Vec::new(),
        }
    }
}

/// A role assigned to a user by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    MissingCredentials,
    #[error("{0}")]
    MalformedHeader(&'static str),
    #[error("Token is expired")]
    Expired,
    #[error("Incorrect claims, please check the audience and issuer")]
    InvalidClaims,
    #[error("Unable to find appropriate key")]
    UnknownKey,
    #[error("Unable to parse authentication token: {0}")]
    InvalidToken(String),
    #[error("Invalid session key")]
    InvalidSessionKey,
    #[error("identity provider request failed: {0}")]
    Upstream(String),
    #[error("identity provider is misconfigured: {0}")]
    Misconfigured(String),
}

impl AuthError {
    /// Machine readable code returned in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "not_authenticated",
            AuthError::Upstream(_) => "upstream_error",
            AuthError::Misconfigured(_) => "internal_error",
            _ => "authentication_failed",
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AuthError::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AuthError::Upstream(_) | AuthError::Misconfigured(_) => {
                log::error!("{self}");
                HttpResponse::build(self.status_code()).json(json!({ "error": self.code() }))
            }
            _ => HttpResponse::build(self.status_code())
                .insert_header((WWW_AUTHENTICATE, r#"Bearer realm="api""#))
                .json(json!({
                    "error": self.code(),
                    "detail": self.to_string(),
                })),
        }
    }
}

/// Capability interface over the identity provider.
pub trait IdentityGateway {
    /// Verify a raw bearer token and return its claims.
    fn verify_token(&self, token: &str) -> Result<Claims, AuthError>;

    /// Roles assigned to `user_id`, fetched from the provider.
    fn get_roles(&self, user_id: &str) -> impl Future<Output = Result<Vec<Role>, AuthError>>;
}

/// Whether `role` is among `roles`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|candidate| candidate == role)
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[test]
    fn roles_are_read_from_the_custom_claim() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "auth0|1",
            "exp": 10,
            "https://shop.test/roles": ["admin", "buyer", 3],
        }))
        .expect("claims should parse");

        assert_eq!(claims.roles("https://shop.test/roles"), vec!["admin", "buyer"]);
        assert!(claims.roles("missing").is_empty());
    }

    #[test]
    fn check_role_matches_exactly() {
        let roles = vec!["admin".to_string()];

        assert!(check_role("admin", &roles));
        assert!(!check_role("adm", &roles));
    }

    #[actix_web::test]
    async fn missing_credentials_render_not_authenticated() {
        let response = AuthError::MissingCredentials.error_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(WWW_AUTHENTICATE));

        let body = to_bytes(response.into_body()).await.expect("body");
        let body: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(body["error"], "not_authenticated");
    }

    #[test]
    fn rejected_tokens_share_one_code() {
        for err in [
            AuthError::Expired,
            AuthError::InvalidClaims,
            AuthError::UnknownKey,
            AuthError::MalformedHeader("Token not found"),
        ] {
            assert_eq!(err.code(), "authentication_failed");
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn upstream_failures_are_bad_gateway() {
        assert_eq!(
            AuthError::Upstream("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
