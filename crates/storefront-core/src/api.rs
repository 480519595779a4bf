//! # Storefront API Trait
//!
//! The external collaborators the storefront calls: Cart Store, Coupon
//! Service, Address Book and Checkout Gateway. They all live behind one
//! REST API, so one trait covers them; implementations decide transport.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   StorefrontApi (trait)                     │
//! │  ├── fetch_cart() / update_quantity() / remove_line()       │
//! │  ├── list_coupons()                                         │
//! │  ├── list_addresses()                                       │
//! │  └── create_checkout()                                      │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┴─────────────────┐
//!  ┌───────┴────────┐                ┌─────────┴──────┐
//!  │ HttpStorefront │                │  test doubles  │
//!  └────────────────┘                └────────────────┘
//! ```

use crate::address::Address;
use crate::cart::Cart;
use crate::checkout::{CheckoutPayload, CheckoutSession};
use crate::coupon::Coupon;
use crate::error::StorefrontResult;
use crate::money::Amount;
use async_trait::async_trait;
use std::sync::Arc;

/// Calls into the external storefront API.
///
/// Failures on reads are `Network`/`FetchFailed`; mutations refused by the
/// backend are `Rejected` carrying the server's message.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// Fetch the user's cart.
    async fn fetch_cart(&self, user_id: &str) -> StorefrontResult<Cart>;

    /// Set the quantity of one line.
    ///
    /// # Arguments
    /// * `user_id` - Cart owner
    /// * `line_ref` - Colour variant ID of the line
    /// * `quantity` - New quantity (callers never send less than 1)
    async fn update_quantity(
        &self,
        user_id: &str,
        line_ref: &str,
        quantity: u32,
    ) -> StorefrontResult<()>;

    /// Remove one line from the cart.
    async fn remove_line(&self, user_id: &str, line_ref: &str) -> StorefrontResult<()>;

    /// Coupons valid for `subtotal`.
    async fn list_coupons(&self, user_id: &str, subtotal: Amount) -> StorefrontResult<Vec<Coupon>>;

    /// The user's shipping addresses.
    async fn list_addresses(&self, user_id: &str) -> StorefrontResult<Vec<Address>>;

    /// Create a hosted payment session for the payload.
    async fn create_checkout(&self, payload: &CheckoutPayload) -> StorefrontResult<CheckoutSession>;

    /// Name used in logs
    fn name(&self) -> &'static str {
        "storefront-api"
    }
}

/// Type alias for a shared API handle (dynamic dispatch)
pub type BoxedStorefrontApi = Arc<dyn StorefrontApi>;
