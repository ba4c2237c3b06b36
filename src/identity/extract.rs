use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use serde::Serialize;

use crate::domain::cart::CartOwner;
use crate::identity::{Auth0Gateway, AuthError};

/// Header carrying the key of an anonymous cart.
pub const SESSION_KEY_HEADER: &str = "X-Session-Key";

const SESSION_KEY_MAX_LEN: usize = 64;

/// Caller identity established from a verified bearer token.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthenticatedUser {
    /// Subject of the token.
    pub sub: String,
    /// Role names granted in the token.
    pub roles: Vec<String>,
    /// Expiry as a unix timestamp.
    pub exp: u64,
}

/// Token from an `Authorization: Bearer <token>` header. `Ok(None)` when the
/// header is absent.
fn bearer_token(req: &HttpRequest) -> Result<Option<&str>, AuthError> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| {
        AuthError::MalformedHeader("Authorization header contains invalid characters")
    })?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), _, _) if !scheme.eq_ignore_ascii_case("bearer") => Err(
            AuthError::MalformedHeader("Authorization header must start with Bearer"),
        ),
        (None, _, _) => Err(AuthError::MalformedHeader(
            "Authorization header must start with Bearer",
        )),
        (Some(_), None, _) => Err(AuthError::MalformedHeader("Token not found")),
        (Some(_), Some(_), Some(_)) => Err(AuthError::MalformedHeader(
            "Authorization header must be Bearer token",
        )),
        (Some(_), Some(token), None) => Ok(Some(token)),
    }
}

fn authenticate(req: &HttpRequest, token: &str) -> Result<AuthenticatedUser, AuthError> {
    let gateway = req.app_data::<web::Data<Auth0Gateway>>().ok_or_else(|| {
        AuthError::Misconfigured("identity gateway is not registered".to_string())
    })?;

    gateway.authenticate(token)
}

fn session_key(req: &HttpRequest) -> Result<Option<String>, AuthError> {
    let Some(value) = req.headers().get(SESSION_KEY_HEADER) else {
        return Ok(None);
    };

    let key = value
        .to_str()
        .map_err(|_| AuthError::InvalidSessionKey)?
        .trim();

    let valid = !key.is_empty()
        && key.len() <= SESSION_KEY_MAX_LEN
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');

    if valid {
        Ok(Some(key.to_string()))
    } else {
        Err(AuthError::InvalidSessionKey)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            bearer_token(req)
                .and_then(|token| token.ok_or(AuthError::MissingCredentials))
                .and_then(|token| authenticate(req, token)),
        )
    }
}

/// Resolves the cart owner: the bearer token's subject when an
/// `Authorization` header is sent, otherwise the anonymous session key.
impl FromRequest for CartOwner {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let owner = match bearer_token(req) {
            Ok(Some(token)) => authenticate(req, token).map(|user| CartOwner::User(user.sub)),
            Ok(None) => session_key(req).and_then(|key| {
                key.map(CartOwner::Session)
                    .ok_or(AuthError::MissingCredentials)
            }),
            Err(err) => Err(err),
        };

        ready(owner)
    }
}
