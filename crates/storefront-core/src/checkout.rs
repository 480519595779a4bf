//! # Checkout Types
//!
//! The checkout request sent to the gateway and the hosted session it
//! returns. The payload carries every input the server needs to re-derive
//! the totals itself; the client grand total is advisory.

use crate::address::Address;
use crate::cart::Cart;
use crate::coupon::Coupon;
use crate::error::{StorefrontError, StorefrontResult};
use crate::money::Amount;
use crate::payment_method::PaymentMethod;
use crate::pricing::PricingSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cart line as sent to the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: String,
    #[serde(rename = "productColorId")]
    pub color_variant_id: String,
    pub product_name: String,
    pub quantity: u32,
    /// Unit price
    pub price: Amount,
    /// Line total
    pub total: Amount,
}

/// Request that creates a hosted payment session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub cart_id: String,

    /// Line items
    #[serde(rename = "cart")]
    pub lines: Vec<CheckoutLine>,

    pub address_id: String,

    /// Payment method ID
    pub payment_method: String,

    /// Subtotal after discount
    pub subtotal: Amount,

    pub payment_fee: Amount,

    /// True only when a coupon is selected and it reduced the price
    #[serde(rename = "isDiscount")]
    pub coupon_applied: bool,

    #[serde(rename = "discount_amount")]
    pub discount: Amount,

    /// Applied coupon, `None` unless `coupon_applied`
    pub coupon_id: Option<String>,

    pub user_id: String,

    /// Client-side grand total; the server's own figure is authoritative
    #[serde(rename = "clientGrandTotal")]
    pub grand_total: Amount,
}

impl CheckoutPayload {
    /// Number of units being bought
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// Assemble the checkout request.
///
/// Fails without side effects when the cart is not loaded or when no
/// address or payment method is selected.
pub fn build_checkout_payload(
    cart: &Cart,
    address: Option<&Address>,
    method: Option<&PaymentMethod>,
    coupon: Option<&Coupon>,
    snapshot: &PricingSnapshot,
    user_id: &str,
) -> StorefrontResult<CheckoutPayload> {
    let address = address.ok_or(StorefrontError::MissingAddress)?;
    let method = method.ok_or(StorefrontError::MissingPaymentMethod)?;
    let cart_id = cart.id.clone().ok_or(StorefrontError::CartNotLoaded)?;

    let applied = coupon.filter(|_| snapshot.has_discount());

    let lines = cart
        .items
        .iter()
        .map(|item| CheckoutLine {
            product_id: item.product_id.clone(),
            color_variant_id: item.color_variant_id.clone(),
            product_name: item.display_name(),
            quantity: item.quantity,
            price: item.unit_price,
            total: item.line_total,
        })
        .collect();

    Ok(CheckoutPayload {
        cart_id,
        lines,
        address_id: address.id.clone(),
        payment_method: method.id.clone(),
        subtotal: snapshot.subtotal_after_discount,
        payment_fee: snapshot.payment_fee,
        coupon_applied: applied.is_some(),
        discount: snapshot.discount,
        coupon_id: applied.map(|c| c.id.clone()),
        user_id: user_id.to_string(),
        grand_total: snapshot.grand_total,
    })
}

/// A hosted payment session created by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Gateway session handle
    pub session_handle: String,

    /// Hosted payment page to redirect the customer to
    pub checkout_url: String,

    /// Total the server computed, if it reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_total: Option<Amount>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl CheckoutSession {
    /// Create a new checkout session
    pub fn new(session_handle: impl Into<String>, checkout_url: impl Into<String>) -> Self {
        Self {
            session_handle: session_handle.into(),
            checkout_url: checkout_url.into(),
            server_total: None,
            created_at: Utc::now(),
        }
    }

    /// Builder: record the server's total
    pub fn with_server_total(mut self, total: Amount) -> Self {
        self.server_total = Some(total);
        self
    }

    /// Server total when it differs from the client's grand total
    pub fn total_mismatch(&self, client_total: Amount) -> Option<Amount> {
        self.server_total.filter(|server| *server != client_total)
    }
}

/// Builds redirect URLs for the hosted payment page
#[derive(Debug, Clone)]
pub struct HostedCheckout {
    /// Base URL of the hosted page (e.g., "https://checkout.stripe.com/pay")
    pub base_url: String,
}

impl HostedCheckout {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Redirect URL for a session handle
    pub fn redirect_url(&self, session_handle: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), session_handle)
    }
}

impl Default for HostedCheckout {
    fn default() -> Self {
        Self::new("https://checkout.stripe.com/pay")
    }
}
