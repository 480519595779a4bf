//! # Session Configuration
//!
//! Payment-method catalog and checkout options for the `cart-summary` binary.

use std::path::Path;
use storefront_core::PaymentMethodCatalog;

/// Session-level settings read from the environment
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Optional TOML file with `[[methods]]` entries
    pub payment_methods_path: Option<String>,
    /// Payment method to select after loading
    pub payment_method: Option<String>,
    /// Create a checkout session after printing the summary
    pub checkout: bool,
}

impl SessionConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            payment_methods_path: non_empty("STOREFRONT_PAYMENT_METHODS"),
            payment_method: non_empty("STOREFRONT_PAYMENT_METHOD"),
            checkout: non_empty("STOREFRONT_CHECKOUT")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// Load the payment-method catalog
    pub fn payment_methods(&self) -> anyhow::Result<PaymentMethodCatalog> {
        load_payment_methods(self.payment_methods_path.as_deref())
    }
}

/// Load the payment-method catalog from an explicit path or a config file.
///
/// Falls back to the built-in PromptPay/card catalog when no file is found.
pub fn load_payment_methods(explicit: Option<&str>) -> anyhow::Result<PaymentMethodCatalog> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        return parse_catalog(&content, path);
    }

    let config_paths = [
        "config/payment_methods.toml",
        "../config/payment_methods.toml",
        "../../config/payment_methods.toml",
    ];

    for path in config_paths {
        if Path::new(path).is_file() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
            return parse_catalog(&content, path);
        }
    }

    tracing::debug!("No payment method catalog found, using built-in methods");
    Ok(PaymentMethodCatalog::builtin())
}

fn parse_catalog(content: &str, path: &str) -> anyhow::Result<PaymentMethodCatalog> {
    let catalog = PaymentMethodCatalog::from_toml(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;

    if catalog.is_empty() {
        anyhow::bail!("{} lists no payment methods", path);
    }

    tracing::info!("Loaded {} payment methods from {}", catalog.methods.len(), path);
    Ok(catalog)
}
