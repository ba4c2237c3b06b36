use std::collections::HashMap;

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use crate::identity::{AuthError, Claims};

#[derive(Clone)]
enum Keys {
    /// RS256 keys indexed by `kid`.
    Jwks(HashMap<String, DecodingKey>),
    /// HS256 shared secret.
    Secret(DecodingKey),
}

/// Verifies access tokens and checks their registered claims.
#[derive(Clone)]
pub struct JwtVerifier {
    keys: Keys,
    validation: Validation,
}

impl JwtVerifier {
    /// RS256 verification against the keys of a JWKS document.
    pub fn from_jwks(jwks: &JwkSet, audience: &str, issuer: &str) -> Result<Self, AuthError> {
        let mut keys = HashMap::new();

        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                log::warn!("Skipping JWK without a key id");
                continue;
            };

            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(err) => log::warn!("Skipping unusable JWK {kid}: {err}"),
            }
        }

        if keys.is_empty() {
            return Err(AuthError::Misconfigured(
                "JWKS document contains no usable keys".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[audience]);
        validation.set_issuer(&[issuer]);

        Ok(Self {
            keys: Keys::Jwks(keys),
            validation,
        })
    }

    /// HS256 verification with a shared secret. Audience and issuer are only
    /// checked when given.
    pub fn from_secret(secret: &str, audience: Option<&str>, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);

        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            keys: Keys::Secret(DecodingKey::from_secret(secret.as_bytes())),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| {
            AuthError::InvalidToken("Invalid header. Use a signed JWT access token".to_string())
        })?;

        let key = match &self.keys {
            Keys::Secret(key) => key,
            Keys::Jwks(keys) => header
                .kid
                .as_ref()
                .and_then(|kid| keys.get(kid))
                .ok_or(AuthError::UnknownKey)?,
        };

        decode::<Claims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }
}

fn map_jwt_error(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
        _ => AuthError::InvalidToken(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    use super::*;

    const SECRET: &str = "test-secret";

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("token should encode")
    }

    fn exp_in(seconds: i64) -> i64 {
        Utc::now().timestamp() + seconds
    }

    #[test]
    fn valid_token_yields_claims() {
        let verifier = JwtVerifier::from_secret(SECRET, Some("store-api"), None);
        let token = token(
            json!({ "sub": "auth0|7", "exp": exp_in(3600), "aud": "store-api" }),
            SECRET,
        );

        let claims = verifier.verify(&token).expect("token should verify");

        assert_eq!(claims.sub, "auth0|7");
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let verifier = JwtVerifier::from_secret(SECRET, None, None);
        let token = token(json!({ "sub": "auth0|7", "exp": exp_in(-3600) }), SECRET);

        assert!(matches!(verifier.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn wrong_audience_is_a_claims_error() {
        let verifier = JwtVerifier::from_secret(SECRET, Some("store-api"), None);
        let token = token(
            json!({ "sub": "auth0|7", "exp": exp_in(3600), "aud": "other-api" }),
            SECRET,
        );

        assert!(matches!(verifier.verify(&token), Err(AuthError::InvalidClaims)));
    }

    #[test]
    fn wrong_issuer_is_a_claims_error() {
        let verifier = JwtVerifier::from_secret(SECRET, None, Some("https://shop.test/"));
        let token = token(
            json!({ "sub": "auth0|7", "exp": exp_in(3600), "iss": "https://evil.test/" }),
            SECRET,
        );

        assert!(matches!(verifier.verify(&token), Err(AuthError::InvalidClaims)));
    }

    #[test]
    fn bad_signature_is_rejected() {
        let verifier = JwtVerifier::from_secret(SECRET, None, None);
        let token = token(json!({ "sub": "auth0|7", "exp": exp_in(3600) }), "other");

        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let verifier = JwtVerifier::from_secret(SECRET, None, None);

        assert!(matches!(
            verifier.verify("not-a-jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn jwks_without_usable_keys_is_misconfigured() {
        let jwks: JwkSet = serde_json::from_value(json!({ "keys": [] })).expect("jwks");

        let result = JwtVerifier::from_jwks(&jwks, "store-api", "https://shop.test/");

        assert!(matches!(result, Err(AuthError::Misconfigured(_))));
    }

    #[test]
    fn unknown_kid_is_reported() {
        let jwks: JwkSet = serde_json::from_value(json!({
            "keys": [{
                "kty": "RSA",
                "kid": "known",
                "use": "sig",
                "alg": "RS256",
                "n": "u1SU1LfVLPHCozMxH2Mo4lgOEePzNm0tRgeLezV6ffAt0gunVTLw7onLRnrq0_IzW7yWR7QkrmBL7jTKEn5u-qKhbwKfBstIs-bMY2Zkp18gnTxKLxoS2tFczGkPLPgizskuemMghRniWaoLcyehkd3qqGElvW_VDL5AaWTg0nLVkjRo9z-40RQzuVaE8AkAFmxZzow3x-VJYKdjykkJ0iT9wCS0DRTXu269V264Vf_3jvredZiKRkgwlL9xNAwxXFg0x_XFw005UWVRIkdgcKWTjpBP2dPwVZ4WWC-9aGVd-Gyn1o0CLelf4rEjGoXbAAEgAqeGUxrcIlbjXfbcmw",
                "e": "AQAB"
            }]
        }))
        .expect("jwks");
        let verifier =
            JwtVerifier::from_jwks(&jwks, "store-api", "https://shop.test/").expect("verifier");

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("unknown".to_string());
        let token = encode(
            &header,
            &json!({ "sub": "auth0|7", "exp": exp_in(3600) }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("token should encode");

        assert!(matches!(verifier.verify(&token), Err(AuthError::UnknownKey)));
    }
}
