use std::sync::Mutex;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::IdentityConfig;
use crate::identity::extract::AuthenticatedUser;
use crate::identity::jwt::JwtVerifier;
use crate::identity::{AuthError, Claims, IdentityGateway, Role};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Management tokens are refreshed this long before they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

fn http_client() -> Result<reqwest::Client, AuthError> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|err| AuthError::Misconfigured(err.to_string()))
}

fn tenant_url(domain: &str) -> Result<Url, AuthError> {
    Url::parse(&format!("https://{domain}/"))
        .map_err(|err| AuthError::Misconfigured(format!("invalid domain {domain}: {err}")))
}

fn upstream(err: reqwest::Error) -> AuthError {
    AuthError::Upstream(err.to_string())
}

/// Client for the provider's management API, authenticated with the
/// client-credentials grant.
pub struct ManagementClient {
    http: reqwest::Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
    audience: String,
    token: Mutex<Option<CachedToken>>,
}

impl ManagementClient {
    pub fn new(
        domain: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            http: http_client()?,
            base_url: tenant_url(domain)?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            audience: audience.into(),
            token: Mutex::new(None),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AuthError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AuthError::Misconfigured("tenant URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `/api/v2/users/{id}/roles` with the user id percent-encoded.
    pub fn roles_url(&self, user_id: &str) -> Result<Url, AuthError> {
        self.endpoint(&["api", "v2", "users", user_id, "roles"])
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.token.lock().ok()?;
        guard
            .as_ref()
            .filter(|token| token.expires_at > Instant::now())
            .map(|token| token.value.clone())
    }

    async fn access_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let response = self
            .http
            .post(self.endpoint(&["oauth", "token"])?)
            .json(&TokenRequest {
                grant_type: "client_credentials",
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                audience: &self.audience,
            })
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?
            .json::<TokenResponse>()
            .await
            .map_err(upstream)?;

        if let (Some(expires_in), Ok(mut guard)) = (response.expires_in, self.token.lock()) {
            let lifetime = Duration::from_secs(expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
            *guard = Some(CachedToken {
                value: response.access_token.clone(),
                expires_at: Instant::now() + lifetime,
            });
        }

        Ok(response.access_token)
    }

    pub async fn user_roles(&self, user_id: &str) -> Result<Vec<Role>, AuthError> {
        let token = self.access_token().await?;

        self.http
            .get(self.roles_url(user_id)?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?
            .json::<Vec<Role>>()
            .await
            .map_err(upstream)
    }
}

/// Identity gateway backed by an Auth0 tenant.
pub struct Auth0Gateway {
    verifier: JwtVerifier,
    management: Option<ManagementClient>,
    roles_claim: String,
}

impl Auth0Gateway {
    pub fn new(verifier: JwtVerifier, roles_claim: impl Into<String>) -> Self {
        Self {
            verifier,
            management: None,
            roles_claim: roles_claim.into(),
        }
    }

    pub fn with_management(mut self, client: ManagementClient) -> Self {
        self.management = Some(client);
        self
    }

    /// Build the gateway from configuration, loading or fetching the tenant's
    /// signing keys unless a shared secret is configured.
    pub async fn from_config(config: &IdentityConfig) -> Result<Self, AuthError> {
        let issuer = config.issuer();

        let verifier = match (&config.jwt_secret, &config.domain, &config.audience) {
            (Some(secret), _, audience) => {
                log::warn!("Verifying tokens with a shared secret");
                JwtVerifier::from_secret(secret, audience.as_deref(), issuer.as_deref())
            }
            (None, Some(domain), Some(audience)) => {
                let jwks = load_jwks(config, domain).await?;
                let issuer = issuer.unwrap_or_else(|| format!("https://{domain}/"));
                JwtVerifier::from_jwks(&jwks, audience, &issuer)?
            }
            _ => {
                return Err(AuthError::Misconfigured(
                    "no token verification keys configured".to_string(),
                ));
            }
        };

        let mut gateway = Self::new(verifier, config.roles_claim.clone());

        if let Some(credentials) = config.management_credentials() {
            gateway = gateway.with_management(ManagementClient::new(
                credentials.domain,
                credentials.client_id,
                credentials.client_secret,
                credentials.audience,
            )?);
        } else {
            log::warn!("Management API credentials not set, role lookups are disabled");
        }

        Ok(gateway)
    }

    /// Verify `token` and build the caller's identity from its claims.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.verify_token(token).inspect_err(|err| {
            log::warn!("Rejected bearer token: {err}");
        })?;

        Ok(AuthenticatedUser {
            roles: claims.roles(&self.roles_claim),
            sub: claims.sub,
            exp: claims.exp,
        })
    }
}

impl IdentityGateway for Auth0Gateway {
    fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verifier.verify(token)
    }

    async fn get_roles(&self, user_id: &str) -> Result<Vec<Role>, AuthError> {
        match &self.management {
            Some(client) => client.user_roles(user_id).await,
            None => Err(AuthError::Misconfigured(
                "management API credentials are not configured".to_string(),
            )),
        }
    }
}

async fn load_jwks(config: &IdentityConfig, domain: &str) -> Result<JwkSet, AuthError> {
    if let Some(path) = &config.jwks_path {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            AuthError::Misconfigured(format!("cannot read {}: {err}", path.display()))
        })?;
        return serde_json::from_str(&contents).map_err(|err| {
            AuthError::Misconfigured(format!("invalid JWKS in {}: {err}", path.display()))
        });
    }

    let mut url = tenant_url(domain)?;
    url.set_path("/.well-known/jwks.json");
    log::info!("Fetching signing keys from {url}");

    http_client()?
        .get(url)
        .send()
        .await
        .map_err(upstream)?
        .error_for_status()
        .map_err(upstream)?
        .json::<JwkSet>()
        .await
        .map_err(upstream)
}
