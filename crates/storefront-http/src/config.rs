//! # API Configuration
//!
//! Configuration for the storefront API client.
//! Values are loaded from environment variables (and `.env` if present).

use std::env;
use std::time::Duration;
use storefront_core::{HostedCheckout, StorefrontError, StorefrontResult};

const DEFAULT_HOSTED_CHECKOUT_URL: &str = "https://checkout.stripe.com/pay";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Storefront API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base URL (e.g., "https://shop.example.com")
    pub api_base_url: String,

    /// ID of the signed-in customer
    pub user_id: String,

    /// Bearer token for the API, if the deployment requires one
    pub auth_token: Option<String>,

    /// Hosted payment page base URL
    pub hosted_checkout_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STOREFRONT_API_URL`
    /// - `STOREFRONT_USER_ID`
    ///
    /// Optional: `STOREFRONT_TOKEN`, `STOREFRONT_HOSTED_CHECKOUT_URL`,
    /// `STOREFRONT_TIMEOUT_SECS`.
    pub fn from_env() -> StorefrontResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup (env, test maps)
    pub fn from_lookup<F>(lookup: F) -> StorefrontResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("STOREFRONT_API_URL").ok_or_else(|| {
            StorefrontError::Configuration("STOREFRONT_API_URL not set".to_string())
        })?;

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(StorefrontError::Configuration(
                "STOREFRONT_API_URL must start with http:// or https://".to_string(),
            ));
        }

        let user_id = lookup("STOREFRONT_USER_ID")
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                StorefrontError::Configuration("STOREFRONT_USER_ID not set".to_string())
            })?;

        let timeout_secs = match lookup("STOREFRONT_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                StorefrontError::Configuration(format!(
                    "STOREFRONT_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            user_id,
            auth_token: lookup("STOREFRONT_TOKEN").filter(|t| !t.is_empty()),
            hosted_checkout_url: lookup("STOREFRONT_HOSTED_CHECKOUT_URL")
                .unwrap_or_else(|| DEFAULT_HOSTED_CHECKOUT_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(api_base_url: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            user_id: user_id.into(),
            auth_token: None,
            hosted_checkout_url: DEFAULT_HOSTED_CHECKOUT_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: set bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Builder: set hosted checkout base URL
    pub fn with_hosted_checkout_url(mut self, url: impl Into<String>) -> Self {
        self.hosted_checkout_url = url.into();
        self
    }

    /// Full URL for an API path such as `/api/cart/update`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// Redirect helper for the hosted payment page
    pub fn hosted_checkout(&self) -> HostedCheckout {
        HostedCheckout::new(&self.hosted_checkout_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_from_lookup() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("STOREFRONT_API_URL", "https://shop.example.com/"),
            ("STOREFRONT_USER_ID", "user-1"),
            ("STOREFRONT_TOKEN", "jwt"),
            ("STOREFRONT_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://shop.example.com");
        assert_eq!(config.url("/api/cart/user-1"), "https://shop.example.com/api/cart/user-1");
        assert_eq!(config.auth_token.as_deref(), Some("jwt"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.hosted_checkout_url, DEFAULT_HOSTED_CHECKOUT_URL);
    }

    #[test]
    fn test_missing_values() {
        let err = ApiConfig::from_lookup(lookup_from(&[("STOREFRONT_USER_ID", "u")])).unwrap_err();
        assert!(matches!(err, StorefrontError::Configuration(_)));

        let err = ApiConfig::from_lookup(lookup_from(&[
            ("STOREFRONT_API_URL", "https://shop.example.com"),
            ("STOREFRONT_USER_ID", "  "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("STOREFRONT_USER_ID"));
    }

    #[test]
    fn test_invalid_values() {
        let err = ApiConfig::from_lookup(lookup_from(&[
            ("STOREFRONT_API_URL", "shop.example.com"),
            ("STOREFRONT_USER_ID", "u"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("http://"));

        let err = ApiConfig::from_lookup(lookup_from(&[
            ("STOREFRONT_API_URL", "http://localhost:4000"),
            ("STOREFRONT_USER_ID", "u"),
            ("STOREFRONT_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("STOREFRONT_TIMEOUT_SECS"));
    }
}
