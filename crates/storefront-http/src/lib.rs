//! # storefront-http
//!
//! HTTP implementation of the storefront collaborators.
//!
//! `HttpStorefrontApi` talks to the external storefront REST API:
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/cart/{user_id}` | Fetch cart |
//! | PUT | `/api/cart/update` | Set line quantity |
//! | DELETE | `/api/cart/remove` | Remove line |
//! | GET | `/api/coupon/user?total=` | Coupons valid for a subtotal |
//! | GET | `/api/address?userId=` | Shipping addresses |
//! | POST | `/api/orders/checkout` | Create hosted payment session |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront_http::HttpStorefrontApi;
//! use storefront_core::StorefrontApi;
//!
//! let api = HttpStorefrontApi::from_env()?;
//! let cart = api.fetch_cart(&api.config().user_id).await?;
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::HttpStorefrontApi;
pub use config::ApiConfig;
