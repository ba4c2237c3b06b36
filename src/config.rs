//! Process settings read from the environment at start-up.

use std::fmt;
use std::path::PathBuf;

use reqwest::Url;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "app.db";
const DEFAULT_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ROLES_CLAIM: &str = "https://pushkind.store/roles";
const DEFAULT_CATALOG_SOURCE: &str = "https://api.escuelajs.co/api/v1/products";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("either JWT_SECRET or AUTH0_DOMAIN and AUTH0_AUDIENCE must be set")]
    MissingIdentity,
}

/// Settings for the HTTP server and its collaborators.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub identity: IdentityConfig,
}

/// Settings for bearer token verification and the provider's management API.
#[derive(Clone, Default)]
pub struct IdentityConfig {
    /// Tenant domain, e.g. `example.eu.auth0.com`.
    pub domain: Option<String>,
    /// Expected `aud` claim of incoming tokens.
    pub audience: Option<String>,
    /// Expected `iss` claim; defaults to `https://<domain>/`.
    pub issuer: Option<String>,
    /// Local JWKS document used instead of fetching it from the tenant.
    pub jwks_path: Option<PathBuf>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Custom claim carrying the caller's role names.
    pub roles_claim: String,
    /// Shared HS256 secret. When set, tokens are verified with it instead of
    /// the tenant's keys.
    pub jwt_secret: Option<String>,
}

impl IdentityConfig {
    /// Issuer expected in tokens, derived from the domain when not configured.
    pub fn issuer(&self) -> Option<String> {
        self.issuer.clone().or_else(|| {
            self.domain
                .as_ref()
                .map(|domain| format!("https://{domain}/"))
        })
    }

    /// Credentials for the provider's management API, when all of them are set.
    pub fn management_credentials(&self) -> Option<ManagementCredentials<'_>> {
        match (&self.domain, &self.client_id, &self.client_secret) {
            (Some(domain), Some(client_id), Some(client_secret)) => Some(ManagementCredentials {
                domain,
                client_id,
                client_secret,
                audience: format!("https://{domain}/api/v2/"),
            }),
            _ => None,
        }
    }
}

/// Client-credentials grant used for role lookups.
pub struct ManagementCredentials<'a> {
    pub domain: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub audience: String,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("domain", &self.domain)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("jwks_path", &self.jwks_path)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("roles_claim", &self.roles_claim)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

impl ServerConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "PORT",
                    value,
                })?,
            None => DEFAULT_PORT,
        };

        let identity = IdentityConfig {
            domain: var("AUTH0_DOMAIN").map(|domain| {
                domain
                    .trim()
                    .trim_start_matches("https://")
                    .trim_end_matches('/')
                    .to_string()
            }),
            audience: var("AUTH0_AUDIENCE"),
            issuer: var("AUTH0_ISSUER"),
            jwks_path: var("AUTH0_JWKS_PATH").map(PathBuf::from),
            client_id: var("AUTH0_M2M_CLIENT_ID"),
            client_secret: var("AUTH0_M2M_CLIENT_SECRET"),
            roles_claim: var("AUTH0_ROLES_CLAIM").unwrap_or_else(|| DEFAULT_ROLES_CLAIM.to_string()),
            jwt_secret: var("JWT_SECRET"),
        };

        if identity.jwt_secret.is_none()
            && (identity.domain.is_none() || identity.audience.is_none())
        {
            return Err(ConfigError::MissingIdentity);
        }

        Ok(Self {
            address: var("ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            port,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            identity,
        })
    }
}

/// Settings for the catalog import command.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub database_url: String,
    /// Endpoint returning the product feed as a JSON array.
    pub source_url: Url,
}

impl ImportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let source =
            var("CATALOG_SOURCE_URL").unwrap_or_else(|| DEFAULT_CATALOG_SOURCE.to_string());
        let source_url = Url::parse(source.trim()).map_err(|_| ConfigError::InvalidValue {
            name: "CATALOG_SOURCE_URL",
            value: source.clone(),
        })?;

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            source_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_with_a_shared_secret() {
        let config = ServerConfig::from_lookup(lookup(&[("JWT_SECRET", "dev")]))
            .expect("config should load");

        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "app.db");
        assert_eq!(config.identity.roles_claim, DEFAULT_ROLES_CLAIM);
        assert_eq!(config.identity.issuer(), None);
    }

    #[test]
    fn tenant_settings_derive_issuer_and_management_audience() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("AUTH0_DOMAIN", "https://shop.eu.auth0.com/"),
            ("AUTH0_AUDIENCE", "https://api.shop.test"),
            ("AUTH0_M2M_CLIENT_ID", "client"),
            ("AUTH0_M2M_CLIENT_SECRET", "secret"),
            ("PORT", "9000"),
        ]))
        .expect("config should load");

        let identity = &config.identity;
        assert_eq!(identity.domain.as_deref(), Some("shop.eu.auth0.com"));
        assert_eq!(
            identity.issuer().as_deref(),
            Some("https://shop.eu.auth0.com/")
        );
        let credentials = identity
            .management_credentials()
            .expect("management credentials");
        assert_eq!(credentials.client_id, "client");
        assert_eq!(credentials.audience, "https://shop.eu.auth0.com/api/v2/");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn partial_management_settings_disable_role_lookups() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "dev"),
            ("AUTH0_DOMAIN", "shop.eu.auth0.com"),
            ("AUTH0_M2M_CLIENT_ID", "client"),
        ]))
        .expect("config should load");

        assert!(config.identity.management_credentials().is_none());
    }

    #[test]
    fn missing_identity_settings_are_rejected() {
        let result = ServerConfig::from_lookup(lookup(&[("AUTH0_DOMAIN", "shop.auth0.com")]));

        assert_eq!(result.err(), Some(ConfigError::MissingIdentity));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result =
            ServerConfig::from_lookup(lookup(&[("JWT_SECRET", "dev"), ("PORT", "eighty")]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "super-secret"),
            ("AUTH0_M2M_CLIENT_SECRET", "m2m-secret"),
        ]))
        .expect("config should load");

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("m2m-secret"));
    }

    #[test]
    fn import_defaults_to_the_public_feed() {
        let config = ImportConfig::from_lookup(lookup(&[])).expect("config should load");

        assert_eq!(config.database_url, "app.db");
        assert_eq!(config.source_url.as_str(), DEFAULT_CATALOG_SOURCE);
    }

    #[test]
    fn import_rejects_an_invalid_source() {
        let result = ImportConfig::from_lookup(lookup(&[("CATALOG_SOURCE_URL", "not a url")]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "CATALOG_SOURCE_URL",
                ..
            })
        ));
    }
}
