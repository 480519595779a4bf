//! # storefront-session
//!
//! Per-session cart and pricing state for the storefront.
//!
//! `CartSession` keeps the cart, valid coupons, addresses and selections for
//! one shopper, re-derives the `PricingSnapshot` after every change and
//! publishes a `SessionView` on a watch channel.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_core::PaymentMethodCatalog;
//! use storefront_http::HttpStorefrontApi;
//! use storefront_session::CartSession;
//!
//! let api = HttpStorefrontApi::from_env()?;
//! let user_id = api.config().user_id.clone();
//! let session = CartSession::new(Arc::new(api), user_id, PaymentMethodCatalog::builtin());
//!
//! session.load().await?;
//! session.set_quantity("color-1", 3).await?;
//! let checkout = session.checkout().await?;
//! ```

pub mod config;
pub mod session;
pub mod state;

// Re-exports
pub use config::{load_payment_methods, SessionConfig};
pub use session::CartSession;
pub use state::{MutationGuard, Notice, NoticeKind, Phase, SessionState, SessionView};
