//! # cart-summary
//!
//! Loads the configured user's cart, prints the priced summary and,
//! optionally, creates a hosted checkout session.
//!
//! ## Usage
//!
//! ```bash
//! export STOREFRONT_API_URL=https://api.example.com
//! export STOREFRONT_USER_ID=64f1...
//! export STOREFRONT_TOKEN=eyJ...
//!
//! # Optional
//! export STOREFRONT_PAYMENT_METHOD=card
//! export STOREFRONT_CHECKOUT=1
//!
//! cart-summary
//! ```

use std::sync::Arc;
use storefront_core::Currency;
use storefront_http::HttpStorefrontApi;
use storefront_session::{CartSession, SessionConfig, SessionView};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let config = SessionConfig::from_env();
    let methods = config.payment_methods()?;

    let api = HttpStorefrontApi::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to initialize storefront API: {}", e))?;
    let user_id = api.config().user_id.clone();
    info!("Storefront API: {}", api.config().api_base_url);

    let session = CartSession::new(Arc::new(api), user_id, methods);
    session.load().await?;

    if let Some(method_id) = config.payment_method.as_deref() {
        session.select_payment_method(Some(method_id)).await?;
    }

    let view = session.view().await;
    print_summary(&view);

    if config.checkout {
        let checkout = session.checkout().await?;
        info!("Checkout session created: {}", checkout.session_handle);
        println!("\n  Pay at: {}", checkout.checkout_url);
    }

    Ok(())
}

fn print_summary(view: &SessionView) {
    let thb = Currency::THB;

    if let Some(err) = &view.address_error {
        warn!("Addresses unavailable: {}", err);
    }

    println!("  Cart ({} items)", view.item_count);
    for line in &view.cart.items {
        println!(
            "    {:<32} {:>3} x {:>12} = {:>12}",
            line.display_name(),
            line.quantity,
            thb.format(line.unit_price),
            thb.format(line.line_total)
        );
    }

    let s = &view.snapshot;
    println!();
    println!("  {:<20} {:>14}", "Subtotal", thb.format(s.subtotal_before_discount));
    if s.has_discount() {
        println!("  {:<20} {:>14}", "Discount", format!("-{}", thb.format(s.discount)));
    }
    println!("  {:<20} {:>14}", "Payment fee", thb.format(s.payment_fee));
    println!("  {:<20} {:>14}", "Total", thb.format(s.grand_total));

    if let Some(method) = &view.payment_method_id {
        println!("  Paying with: {}", method);
    }
    if let Some(coupon) = &view.selected_coupon_id {
        println!("  Coupon: {}", coupon);
    }
}

fn print_banner() {
    println!(
        r#"
  🛒 Storefront Cart
  ━━━━━━━━━━━━━━━━━━━━━━━
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
