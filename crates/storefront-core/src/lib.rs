//! # storefront-core
//!
//! Core types and the pricing engine for the storefront cart.
//!
//! This crate provides:
//! - `Cart`, `LineItem`, `Coupon`, `PaymentMethod`, `Address` domain types
//! - the pricing engine (`pricing`) deriving a `PricingSnapshot`
//! - `build_checkout_payload` for the checkout handoff
//! - the `StorefrontApi` trait for the external collaborators
//! - `StorefrontError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use storefront_core::{build_checkout_payload, PaymentMethod, PricingSnapshot};
//!
//! let method = PaymentMethod::card();
//! let snapshot = PricingSnapshot::derive(&cart, coupon.as_ref(), Some(&method));
//!
//! let payload = build_checkout_payload(
//!     &cart, Some(&address), Some(&method), coupon.as_ref(), &snapshot, user_id,
//! )?;
//! let session = api.create_checkout(&payload).await?;
//!
//! // Redirect user to session.checkout_url
//! ```

pub mod address;
pub mod api;
pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod error;
pub mod money;
pub mod payment_method;
pub mod pricing;

// Re-exports for convenience
pub use address::Address;
pub use api::{BoxedStorefrontApi, StorefrontApi};
pub use cart::{floor_quantity, Cart, LineItem};
pub use checkout::{
    build_checkout_payload, CheckoutLine, CheckoutPayload, CheckoutSession, HostedCheckout,
};
pub use coupon::{Coupon, DiscountType};
pub use error::{ErrorKind, StorefrontError, StorefrontResult};
pub use money::{Amount, Currency};
pub use payment_method::{PaymentMethod, PaymentMethodCatalog};
pub use pricing::{reconcile_coupon, PricingSnapshot};
