//! # Cart Session
//!
//! One shopper's cart page: drives [`SessionState`] from the storefront API
//! and publishes a [`SessionView`] after every change.
//!
//! ```text
//! load() ──┬── fetch_cart ──► apply_cart ──► list_coupons ──► apply_coupons
//!          └── list_addresses ──► apply_addresses
//!
//! set_quantity / remove ──► API call ──► (notice on failure) ──► fetch_cart ──► ...
//! ```
//!
//! The state lock is taken only between collaborator calls, never across one.

use crate::state::{Notice, SessionState, SessionView, Ticket};
use storefront_core::{
    floor_quantity, BoxedStorefrontApi, CheckoutSession, PaymentMethodCatalog, PricingSnapshot,
    StorefrontError, StorefrontResult,
};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, instrument, warn};

enum Mutation {
    SetQuantity(u32),
    Remove,
}

/// Per-session cart and pricing state
pub struct CartSession {
    api: BoxedStorefrontApi,
    user_id: String,
    methods: PaymentMethodCatalog,
    state: Mutex<SessionState>,
    updates: watch::Sender<SessionView>,
}

impl CartSession {
    /// Create a session; the catalog's first method is preselected
    pub fn new(
        api: BoxedStorefrontApi,
        user_id: impl Into<String>,
        methods: PaymentMethodCatalog,
    ) -> Self {
        let state = SessionState::new(methods.default_method().cloned());
        let (updates, _) = watch::channel(state.view());

        Self {
            api,
            user_id: user_id.into(),
            methods,
            state: Mutex::new(state),
            updates,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn payment_methods(&self) -> &PaymentMethodCatalog {
        &self.methods
    }

    /// Apply a change to the state and publish the resulting view
    async fn update<R>(&self, change: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state.lock().await;
        let result = change(&mut state);
        self.updates.send_replace(state.view());
        result
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load cart, coupons and addresses.
    ///
    /// Addresses load alongside the cart; their failure is recorded on the
    /// view and does not fail the load.
    #[instrument(skip(self), fields(user_id = %self.user_id, api = self.api.name()))]
    pub async fn load(&self) -> StorefrontResult<()> {
        let (cart_ticket, address_ticket) = self
            .update(|state| {
                state.begin_load();
                (state.issue_cart_request(), state.issue_address_request())
            })
            .await;

        let (cart, _) = tokio::join!(
            self.sync_cart(cart_ticket),
            self.sync_addresses(address_ticket)
        );
        cart
    }

    /// Retry after an error; same as [`load`](Self::load)
    pub async fn retry(&self) -> StorefrontResult<()> {
        self.load().await
    }

    /// Re-fetch the cart and its coupons
    pub async fn refresh(&self) -> StorefrontResult<()> {
        let ticket = self.update(|state| state.issue_cart_request()).await;
        self.sync_cart(ticket).await
    }

    async fn sync_cart(&self, ticket: Ticket) -> StorefrontResult<()> {
        let fetched = self.api.fetch_cart(&self.user_id).await;

        let outcome = self
            .update(|state| match fetched {
                Ok(cart) => {
                    if !state.apply_cart(ticket, cart) {
                        debug!("Discarded stale cart response: ticket={}", ticket);
                    }
                    Ok(())
                }
                Err(err) => {
                    if state.cart_fetch_failed(ticket, &err) {
                        error!("Cart fetch failed: {}", err);
                    } else {
                        debug!("Ignored failure of superseded cart fetch: {}", err);
                    }
                    Err(err)
                }
            })
            .await;

        self.sync_coupons().await;
        outcome
    }

    async fn sync_coupons(&self) {
        let Some(request) = self.update(|state| state.coupon_request()).await else {
            return;
        };

        let fetched = self.api.list_coupons(&self.user_id, request.subtotal).await;

        self.update(|state| {
            let applied = match fetched {
                Ok(coupons) => state.apply_coupons(&request, coupons),
                Err(err) => {
                    warn!("Coupon fetch failed, continuing without coupons: {}", err);
                    state.coupons_failed(&request)
                }
            };
            if !applied {
                debug!(
                    "Discarded stale coupon response: cart_ticket={}, ticket={}",
                    request.cart_ticket, request.ticket
                );
            }
        })
        .await;
    }

    async fn sync_addresses(&self, ticket: Ticket) {
        let fetched = self.api.list_addresses(&self.user_id).await;

        self.update(|state| match fetched {
            Ok(addresses) => {
                state.apply_addresses(ticket, addresses);
            }
            Err(err) => {
                warn!("Address fetch failed: {}", err);
                state.address_fetch_failed(ticket, &err);
            }
        })
        .await;
    }

    // =========================================================================
    // Cart mutations
    // =========================================================================

    /// Set a line's quantity (values below 1 are sent as 1)
    pub async fn set_quantity(&self, line_ref: &str, quantity: u32) -> StorefrontResult<()> {
        self.mutate(line_ref, Mutation::SetQuantity(floor_quantity(quantity)))
            .await
    }

    /// Add one unit to a line
    pub async fn increment(&self, line_ref: &str) -> StorefrontResult<()> {
        let quantity = self.line_quantity(line_ref).await?.saturating_add(1);
        self.set_quantity(line_ref, quantity).await
    }

    /// Remove one unit from a line; a line at 1 stays at 1 without a call
    pub async fn decrement(&self, line_ref: &str) -> StorefrontResult<()> {
        let current = self.line_quantity(line_ref).await?;
        if current <= 1 {
            return Ok(());
        }
        self.set_quantity(line_ref, current - 1).await
    }

    /// Remove a line from the cart
    pub async fn remove(&self, line_ref: &str) -> StorefrontResult<()> {
        self.mutate(line_ref, Mutation::Remove).await
    }

    async fn line_quantity(&self, line_ref: &str) -> StorefrontResult<u32> {
        let state = self.state.lock().await;
        state
            .cart()
            .find(line_ref)
            .map(|line| line.quantity)
            .ok_or_else(|| StorefrontError::LineNotFound {
                line_ref: line_ref.to_string(),
            })
    }

    /// Send a mutation, then re-sync from the server whatever the outcome.
    ///
    /// The cart is never changed locally; a refused mutation leaves a notice.
    #[instrument(skip(self, mutation), fields(user_id = %self.user_id))]
    async fn mutate(&self, line_ref: &str, mutation: Mutation) -> StorefrontResult<()> {
        // released on drop, including when this future is cancelled
        let guard = self
            .update(|state| {
                if state.cart().find(line_ref).is_none() {
                    return Err(StorefrontError::LineNotFound {
                        line_ref: line_ref.to_string(),
                    });
                }
                Ok(state.begin_mutation())
            })
            .await?;

        let result = match mutation {
            Mutation::SetQuantity(quantity) => {
                debug!("Updating quantity: line={}, quantity={}", line_ref, quantity);
                self.api
                    .update_quantity(&self.user_id, line_ref, quantity)
                    .await
            }
            Mutation::Remove => {
                debug!("Removing line: {}", line_ref);
                self.api.remove_line(&self.user_id, line_ref).await
            }
        };

        if let Err(err) = &result {
            warn!("Cart mutation failed: line={}, reason={}", line_ref, err);
            self.update(|state| state.set_notice(Notice::for_mutation(err)))
                .await;
        }

        let ticket = self.update(|state| state.issue_cart_request()).await;
        let synced = self.sync_cart(ticket).await;
        self.update(|state| state.end_mutation(guard)).await;

        result.and(synced)
    }

    // =========================================================================
    // Selections
    // =========================================================================

    /// Select a coupon from the current valid list, or none
    pub async fn select_coupon(&self, coupon_id: Option<&str>) -> StorefrontResult<()> {
        self.update(|state| state.select_coupon(coupon_id)).await
    }

    /// Select a payment method from the catalog, or none
    pub async fn select_payment_method(&self, method_id: Option<&str>) -> StorefrontResult<()> {
        let methods = &self.methods;
        self.update(|state| state.select_payment_method(methods, method_id))
            .await
    }

    /// Select a shipping address from the address book, or none
    pub async fn select_address(&self, address_id: Option<&str>) -> StorefrontResult<()> {
        self.update(|state| state.select_address(address_id)).await
    }

    /// Clear the blocking notice
    pub async fn dismiss_notice(&self) {
        self.update(|state| state.dismiss_notice()).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current pricing snapshot
    pub async fn snapshot(&self) -> PricingSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Current view
    pub async fn view(&self) -> SessionView {
        self.state.lock().await.view()
    }

    /// Receiver that sees every published view
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.updates.subscribe()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Create a hosted payment session for the current cart.
    ///
    /// Validation errors return before the gateway is called. A gateway
    /// failure leaves a notice; the session stays usable.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn checkout(&self) -> StorefrontResult<CheckoutSession> {
        let payload = self.state.lock().await.checkout_payload(&self.user_id)?;

        info!(
            "Creating checkout: cart_id={}, items={}, total={}",
            payload.cart_id,
            payload.item_count(),
            payload.grand_total
        );

        match self.api.create_checkout(&payload).await {
            Ok(session) => {
                if let Some(server_total) = session.total_mismatch(payload.grand_total) {
                    warn!(
                        "Server total differs from client total: server={}, client={}",
                        server_total, payload.grand_total
                    );
                }
                Ok(session)
            }
            Err(err) => {
                error!("Checkout failed: {}", err);
                self.update(|state| state.set_notice(Notice::for_checkout(&err)))
                    .await;
                Err(err)
            }
        }
    }
}
