//! # Storefront HTTP Client
//!
//! `reqwest` implementation of [`StorefrontApi`] against the storefront REST API.

use crate::config::ApiConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::{
    Address, Amount, Cart, CheckoutPayload, CheckoutSession, Coupon, StorefrontApi,
    StorefrontError, StorefrontResult,
};
use tracing::{debug, error, info, instrument, warn};

const UPDATE_FAILED: &str = "Could not update the item quantity";
const REMOVE_FAILED: &str = "Failed to remove item";

/// HTTP client for the storefront API
pub struct HttpStorefrontApi {
    config: ApiConfig,
    client: Client,
}

impl HttpStorefrontApi {
    /// Create a new client
    pub fn new(config: ApiConfig) -> StorefrontResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                StorefrontError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> StorefrontResult<Self> {
        Self::new(ApiConfig::from_env()?)
    }

    /// Configuration in use
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> StorefrontResult<(reqwest::StatusCode, String)> {
        let response: Response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StorefrontError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StorefrontError::Network(e.to_string()))?;

        Ok((status, body))
    }

    /// GET a JSON resource; failures are transient fetch errors
    async fn fetch<T>(&self, resource: &str, request: RequestBuilder) -> StorefrontResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let (status, body) = self.send(request).await?;

        if !status.is_success() {
            error!("Fetch of {} failed: status={}, body={}", resource, status, body);
            return Err(StorefrontError::FetchFailed {
                resource: resource.to_string(),
                message: server_message(&body).unwrap_or_else(|| format!("HTTP {}", status)),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            StorefrontError::Serialization(format!("Failed to parse {}: {}", resource, e))
        })
    }

    /// Send a cart mutation; failures carry the server's reason
    async fn mutate(&self, request: RequestBuilder, fallback: &str) -> StorefrontResult<()> {
        let (status, body) = self.send(request).await?;

        if !status.is_success() {
            warn!("Cart mutation rejected: status={}, body={}", status, body);
            return Err(StorefrontError::Rejected {
                message: server_message(&body).unwrap_or_else(|| fallback.to_string()),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    #[instrument(skip(self))]
    async fn fetch_cart(&self, user_id: &str) -> StorefrontResult<Cart> {
        let url = self.config.url(&format!("/api/cart/{}", user_id));
        let cart: Cart = self.fetch("cart", self.client.get(&url)).await?;

        debug!("Fetched cart: {} lines", cart.line_count());
        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn update_quantity(
        &self,
        user_id: &str,
        line_ref: &str,
        quantity: u32,
    ) -> StorefrontResult<()> {
        let url = self.config.url("/api/cart/update");
        let body = UpdateQuantityRequest {
            product_color_id: line_ref,
            quantity,
            user_id,
        };

        self.mutate(self.client.put(&url).json(&body), UPDATE_FAILED).await
    }

    #[instrument(skip(self))]
    async fn remove_line(&self, user_id: &str, line_ref: &str) -> StorefrontResult<()> {
        let url = self.config.url("/api/cart/remove");
        let body = RemoveLineRequest {
            product_color_id: line_ref,
            user_id,
        };

        self.mutate(self.client.delete(&url).json(&body), REMOVE_FAILED).await
    }

    #[instrument(skip(self))]
    async fn list_coupons(&self, user_id: &str, subtotal: Amount) -> StorefrontResult<Vec<Coupon>> {
        let url = self.config.url("/api/coupon/user");
        let request = self.client.get(&url).query(&[
            ("userId", user_id.to_string()),
            ("total", subtotal.normalize().to_string()),
        ]);

        let coupons: Vec<Coupon> = self.fetch("coupons", request).await?;
        debug!("{} coupons valid for subtotal {}", coupons.len(), subtotal);
        Ok(coupons)
    }

    #[instrument(skip(self))]
    async fn list_addresses(&self, user_id: &str) -> StorefrontResult<Vec<Address>> {
        let url = self.config.url("/api/address");
        let request = self.client.get(&url).query(&[("userId", user_id)]);
        self.fetch("addresses", request).await
    }

    #[instrument(skip(self, payload), fields(cart_id = %payload.cart_id, items = payload.item_count()))]
    async fn create_checkout(&self, payload: &CheckoutPayload) -> StorefrontResult<CheckoutSession> {
        let url = self.config.url("/api/orders/checkout");
        let idempotency_key = uuid::Uuid::new_v4().to_string();

        let request = self
            .client
            .post(&url)
            .header("Idempotency-Key", &idempotency_key)
            .json(payload);

        let (status, body) = self.send(request).await.map_err(|e| match e {
            StorefrontError::Network(message) => StorefrontError::CheckoutFailed(message),
            other => other,
        })?;

        if !status.is_success() {
            error!("Checkout API error: status={}, body={}", status, body);
            return Err(StorefrontError::CheckoutFailed(
                server_message(&body).unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }

        let response: CheckoutResponse = serde_json::from_str(&body).map_err(|e| {
            StorefrontError::CheckoutFailed(format!("Failed to parse checkout response: {}", e))
        })?;

        let handle = response.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            StorefrontError::CheckoutFailed("Gateway returned no session id".to_string())
        })?;

        let checkout_url = self.config.hosted_checkout().redirect_url(&handle);
        info!("Created checkout session: id={}, url={}", handle, checkout_url);

        let session = CheckoutSession::new(handle, checkout_url);
        Ok(match response.total {
            Some(total) => session.with_server_total(total),
            None => session,
        })
    }

    fn name(&self) -> &'static str {
        "storefront-http"
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateQuantityRequest<'a> {
    product_color_id: &'a str,
    quantity: u32,
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveLineRequest<'a> {
    product_color_id: &'a str,
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    total: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// User-displayable reason from an error body: `message`, then `error`.
///
/// `error` may itself be an object with a `message` field.
fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;

    fn as_text(value: &serde_json::Value) -> Option<String> {
        match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Object(map) => map.get("message").and_then(as_text),
            _ => None,
        }
    }

    parsed
        .message
        .as_ref()
        .and_then(as_text)
        .or_else(|| parsed.error.as_ref().and_then(as_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_prefers_message() {
        assert_eq!(
            server_message(r#"{"message": "Only 2 left", "error": "stock"}"#).as_deref(),
            Some("Only 2 left")
        );
        assert_eq!(
            server_message(r#"{"error": "Out of stock"}"#).as_deref(),
            Some("Out of stock")
        );
        assert_eq!(
            server_message(r#"{"error": {"message": "nested"}}"#).as_deref(),
            Some("nested")
        );
    }

    #[test]
    fn test_server_message_absent() {
        assert!(server_message("<html>Bad Gateway</html>").is_none());
        assert!(server_message(r#"{"message": ""}"#).is_none());
        assert!(server_message("{}").is_none());
    }

    #[test]
    fn test_update_request_wire_names() {
        let body = UpdateQuantityRequest {
            product_color_id: "c1",
            quantity: 3,
            user_id: "u1",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["productColorId"], "c1");
        assert_eq!(json["quantity"], 3);
        assert_eq!(json["userId"], "u1");
    }
}
