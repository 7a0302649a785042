//! Configuration, built from environment variables.

use crate::error::ConfigError;

/// SMTP transport settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

/// Notifier configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint of the managed GraphQL data API.
    pub graphql_endpoint: String,
    /// API key sent as `x-api-key`.
    pub graphql_api_key: String,
    /// Page size for the listing scan.
    pub page_limit: u32,
    pub smtp: SmtpConfig,
}

fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse {raw:?}"),
        }),
    }
}

impl Config {
    /// Build config from environment variables.
    ///
    /// `NOTIFIER_GRAPHQL_URL`, `NOTIFIER_GRAPHQL_API_KEY`, and
    /// `NOTIFIER_SMTP_HOST` are required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let graphql_endpoint = required("NOTIFIER_GRAPHQL_URL")?;
        let graphql_api_key = required("NOTIFIER_GRAPHQL_API_KEY")?;
        let page_limit = parsed_or("NOTIFIER_PAGE_LIMIT", 100)?;

        let host = required("NOTIFIER_SMTP_HOST")?;
        let port = parsed_or("NOTIFIER_SMTP_PORT", 587)?;
        let username = std::env::var("NOTIFIER_SMTP_USERNAME").unwrap_or_default();
        let password = std::env::var("NOTIFIER_SMTP_PASSWORD").unwrap_or_default();
        let from_address =
            std::env::var("NOTIFIER_FROM_ADDRESS").unwrap_or_else(|_| username.clone());

        Ok(Self {
            graphql_endpoint,
            graphql_api_key,
            page_limit,
            smtp: SmtpConfig {
                host,
                port,
                username,
                password,
                from_address,
            },
        })
    }
}
