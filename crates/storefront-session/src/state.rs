//! # Session State
//!
//! Synchronous cart/pricing state for one storefront session.
//! `CartSession` drives it from async collaborator calls; everything here is
//! plain data plus the rules that decide which responses are still current.
//!
//! Every fetch is stamped with a [`Ticket`] taken from one monotonically
//! increasing counter. A cart response is applied only if its ticket is newer
//! than the cart already shown; a coupon response only if it was requested
//! for the cart currently shown and is the newest coupon response so far.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storefront_core::{
    build_checkout_payload, reconcile_coupon, Address, Amount, Cart, CheckoutPayload, Coupon,
    ErrorKind, PaymentMethod, PaymentMethodCatalog, PricingSnapshot, StorefrontError,
    StorefrontResult,
};

/// Request number; higher is more recent. Zero means "never".
pub type Ticket = u64;

/// Lifecycle of the cart and its prices
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Nothing requested yet
    #[default]
    Uninitialized,
    /// First load (or a retry) in flight
    Loading,
    /// Snapshot is final for the current selections
    Ready,
    /// A mutation or its follow-up fetches are in flight
    Recomputing,
    /// Latest cart fetch failed; `retry` re-enters `Loading`
    Errored { message: String },
}

/// What a blocking notice is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// The server refused a quantity change or removal
    MutationRejected,
    /// A mutation could not reach the server
    MutationFailed,
    /// The gateway could not create a checkout session
    CheckoutFailed,
}

/// A user-facing message that stays until dismissed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    /// Notice for a failed cart mutation
    pub fn for_mutation(err: &StorefrontError) -> Self {
        let kind = match err.kind() {
            ErrorKind::Rejected => NoticeKind::MutationRejected,
            _ => NoticeKind::MutationFailed,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }

    /// Notice for a failed checkout
    pub fn for_checkout(err: &StorefrontError) -> Self {
        Self {
            kind: NoticeKind::CheckoutFailed,
            message: err.to_string(),
        }
    }
}

/// Coupon fetch to issue after a cart was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouponRequest {
    pub cart_ticket: Ticket,
    pub ticket: Ticket,
    pub subtotal: Amount,
}

/// Marks one cart mutation as in flight until dropped.
///
/// Dropping the guard (including when the mutating future is cancelled)
/// releases the mutation, so the session can settle on its next change.
#[derive(Debug)]
#[must_use = "the mutation counts as in flight only while the guard lives"]
pub struct MutationGuard(Arc<AtomicUsize>);

impl Drop for MutationGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Read-only copy of the session published to subscribers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub cart: Cart,
    pub snapshot: PricingSnapshot,
    pub coupons: Vec<Coupon>,
    pub selected_coupon_id: Option<String>,
    pub addresses: Vec<Address>,
    pub selected_address_id: Option<String>,
    pub address_error: Option<String>,
    pub payment_method_id: Option<String>,
    pub notice: Option<Notice>,
    /// Number of lines (header badge)
    pub line_count: usize,
    /// Units across all lines
    pub item_count: u32,
}

impl SessionView {
    /// True when the snapshot can be shown as final
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }
}

/// Mutable state of one session
#[derive(Debug, Default)]
pub struct SessionState {
    phase: Phase,
    cart: Cart,
    coupons: Vec<Coupon>,
    selected_coupon: Option<Coupon>,
    addresses: Vec<Address>,
    selected_address: Option<Address>,
    address_error: Option<String>,
    payment_method: Option<PaymentMethod>,
    snapshot: PricingSnapshot,
    notice: Option<Notice>,

    last_ticket: Ticket,
    latest_cart_request: Ticket,
    applied_cart: Ticket,
    applied_coupons: Ticket,
    coupons_for_cart: Ticket,
    latest_address_request: Ticket,
    applied_addresses: Ticket,
    pending_mutations: Arc<AtomicUsize>,
}

impl SessionState {
    /// Fresh state with a preselected payment method
    pub fn new(payment_method: Option<PaymentMethod>) -> Self {
        Self {
            payment_method,
            ..Self::default()
        }
    }

    fn next_ticket(&mut self) -> Ticket {
        self.last_ticket += 1;
        self.last_ticket
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn snapshot(&self) -> PricingSnapshot {
        self.snapshot
    }

    pub fn selected_coupon(&self) -> Option<&Coupon> {
        self.selected_coupon.as_ref()
    }

    pub fn payment_method(&self) -> Option<&PaymentMethod> {
        self.payment_method.as_ref()
    }

    pub fn selected_address(&self) -> Option<&Address> {
        self.selected_address.as_ref()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Enter `Loading` (first load or retry)
    pub fn begin_load(&mut self) {
        self.phase = Phase::Loading;
    }

    /// A cart mutation was issued
    pub fn begin_mutation(&mut self) -> MutationGuard {
        self.pending_mutations.fetch_add(1, Ordering::AcqRel);
        let guard = MutationGuard(Arc::clone(&self.pending_mutations));
        self.settle();
        guard
    }

    /// A cart mutation and its re-sync finished
    pub fn end_mutation(&mut self, guard: MutationGuard) {
        drop(guard);
        self.settle();
    }

    fn settle(&mut self) {
        if matches!(self.phase, Phase::Errored { .. } | Phase::Uninitialized) {
            return;
        }
        if self.applied_cart == 0 {
            // nothing shown yet; stay in Loading until the first cart lands
            return;
        }

        let busy = self.pending_mutations.load(Ordering::Acquire) > 0
            || self.latest_cart_request > self.applied_cart
            || self.coupons_for_cart != self.applied_cart;

        self.phase = match (busy, &self.phase) {
            (false, _) => Phase::Ready,
            (true, Phase::Loading) => Phase::Loading,
            (true, _) => Phase::Recomputing,
        };
    }

    fn recompute(&mut self) {
        self.snapshot = PricingSnapshot::derive(
            &self.cart,
            self.selected_coupon.as_ref(),
            self.payment_method.as_ref(),
        );
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// Stamp a new cart fetch
    pub fn issue_cart_request(&mut self) -> Ticket {
        let ticket = self.next_ticket();
        self.latest_cart_request = ticket;
        self.settle();
        ticket
    }

    /// Apply a fetched cart unless a newer one is already shown.
    ///
    /// Returns false for a stale response.
    pub fn apply_cart(&mut self, ticket: Ticket, cart: Cart) -> bool {
        if ticket <= self.applied_cart {
            return false;
        }

        self.cart = cart;
        self.applied_cart = ticket;
        if matches!(self.phase, Phase::Errored { .. }) && ticket >= self.latest_cart_request {
            self.phase = Phase::Recomputing;
        }

        self.recompute();

        // No subtotal, nothing to ask the coupon service about
        if self.cart.is_empty() || self.snapshot.subtotal_before_discount <= Amount::ZERO {
            self.coupons.clear();
            self.selected_coupon = None;
            self.coupons_for_cart = ticket;
            self.recompute();
        }

        self.settle();
        true
    }

    /// Record a failed cart fetch; only the newest request can error the session
    pub fn cart_fetch_failed(&mut self, ticket: Ticket, err: &StorefrontError) -> bool {
        if ticket != self.latest_cart_request {
            return false;
        }
        self.phase = Phase::Errored {
            message: err.to_string(),
        };
        true
    }

    /// Coupon fetch for the cart currently shown, if it has a positive subtotal.
    ///
    /// The subtotal sent is the one *before* any coupon discount.
    pub fn coupon_request(&mut self) -> Option<CouponRequest> {
        if self.coupons_for_cart == self.applied_cart {
            return None;
        }
        let subtotal = self.snapshot.subtotal_before_discount;
        let ticket = self.next_ticket();
        Some(CouponRequest {
            cart_ticket: self.applied_cart,
            ticket,
            subtotal,
        })
    }

    // -------------------------------------------------------------------------
    // Coupons
    // -------------------------------------------------------------------------

    fn coupon_response_is_current(&self, request: &CouponRequest) -> bool {
        request.cart_ticket == self.applied_cart && request.ticket > self.applied_coupons
    }

    /// Apply a coupon list and reconcile the selection.
    ///
    /// Returns false when the list was for a cart that is no longer shown.
    pub fn apply_coupons(&mut self, request: &CouponRequest, coupons: Vec<Coupon>) -> bool {
        if !self.coupon_response_is_current(request) {
            return false;
        }

        self.selected_coupon = reconcile_coupon(self.selected_coupon.as_ref(), &coupons);
        self.coupons = coupons;
        self.applied_coupons = request.ticket;
        self.coupons_for_cart = request.cart_ticket;
        self.recompute();
        self.settle();
        true
    }

    /// A coupon fetch failed: no coupons offered, none selected
    pub fn coupons_failed(&mut self, request: &CouponRequest) -> bool {
        self.apply_coupons(request, Vec::new())
    }

    /// Select a coupon from the valid list, or clear the selection
    pub fn select_coupon(&mut self, coupon_id: Option<&str>) -> StorefrontResult<()> {
        self.selected_coupon = match coupon_id {
            Some(id) => Some(
                self.coupons
                    .iter()
                    .find(|c| c.id == id)
                    .cloned()
                    .ok_or_else(|| StorefrontError::CouponNotAvailable {
                        coupon_id: id.to_string(),
                    })?,
            ),
            None => None,
        };
        self.recompute();
        self.settle();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Payment method & address
    // -------------------------------------------------------------------------

    /// Select a payment method from the catalog, or clear it
    pub fn select_payment_method(
        &mut self,
        catalog: &PaymentMethodCatalog,
        method_id: Option<&str>,
    ) -> StorefrontResult<()> {
        self.payment_method = match method_id {
            Some(id) => Some(catalog.get(id).cloned().ok_or_else(|| {
                StorefrontError::UnknownPaymentMethod {
                    method_id: id.to_string(),
                }
            })?),
            None => None,
        };
        self.recompute();
        self.settle();
        Ok(())
    }

    /// Stamp a new address fetch
    pub fn issue_address_request(&mut self) -> Ticket {
        let ticket = self.next_ticket();
        self.latest_address_request = ticket;
        ticket
    }

    /// Apply the address book; keeps the selection if still listed, else the first
    pub fn apply_addresses(&mut self, ticket: Ticket, addresses: Vec<Address>) -> bool {
        if ticket <= self.applied_addresses {
            return false;
        }

        let keep = self
            .selected_address
            .as_ref()
            .and_then(|prev| addresses.iter().find(|a| a.id == prev.id));
        self.selected_address = keep.or_else(|| addresses.first()).cloned();
        self.addresses = addresses;
        self.applied_addresses = ticket;
        self.address_error = None;
        true
    }

    /// Record a failed address fetch without touching the cart
    pub fn address_fetch_failed(&mut self, ticket: Ticket, err: &StorefrontError) -> bool {
        if ticket != self.latest_address_request {
            return false;
        }
        self.address_error = Some(err.to_string());
        true
    }

    /// Select a listed address, or clear the selection
    pub fn select_address(&mut self, address_id: Option<&str>) -> StorefrontResult<()> {
        self.selected_address = match address_id {
            Some(id) => Some(
                self.addresses
                    .iter()
                    .find(|a| a.id == id)
                    .cloned()
                    .ok_or_else(|| StorefrontError::UnknownAddress {
                        address_id: id.to_string(),
                    })?,
            ),
            None => None,
        };
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Notices & checkout
    // -------------------------------------------------------------------------

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Build the checkout payload from the current selections.
    ///
    /// Selection errors come first; a session that is not `Ready` is refused
    /// so a stale snapshot is never sent.
    pub fn checkout_payload(&self, user_id: &str) -> StorefrontResult<CheckoutPayload> {
        let payload = build_checkout_payload(
            &self.cart,
            self.selected_address.as_ref(),
            self.payment_method.as_ref(),
            self.selected_coupon.as_ref(),
            &self.snapshot,
            user_id,
        )?;

        if self.phase != Phase::Ready {
            return Err(StorefrontError::NotReady);
        }
        Ok(payload)
    }

    /// Copy for subscribers
    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase.clone(),
            cart: self.cart.clone(),
            snapshot: self.snapshot,
            coupons: self.coupons.clone(),
            selected_coupon_id: self.selected_coupon.as_ref().map(|c| c.id.clone()),
            addresses: self.addresses.clone(),
            selected_address_id: self.selected_address.as_ref().map(|a| a.id.clone()),
            address_error: self.address_error.clone(),
            payment_method_id: self.payment_method.as_ref().map(|m| m.id.clone()),
            notice: self.notice.clone(),
            line_count: self.cart.line_count(),
            item_count: self.cart.item_count(),
        }
    }
}
