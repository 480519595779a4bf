//! Property-based tests for the pricing engine.
//!
//! For any cart, coupon and payment method:
//! 1. Discount bounds: 0 <= discount <= subtotal
//! 2. Monotonicity: a bigger discount never raises the subtotal after discount
//! 3. Fee: whole units, non-decreasing in the amount
//! 4. Idempotence: same inputs, same snapshot
//! 5. Reconciliation keeps a still-valid selection

use proptest::prelude::*;
use rust_decimal::Decimal;
use storefront_core::pricing::{
    discount, payment_fee, reconcile_coupon, subtotal_after_discount, PricingSnapshot,
};
use storefront_core::{Cart, Coupon, LineItem, PaymentMethod};

// =============================================================================
// Strategy helpers
// =============================================================================

/// Non-negative amount with two decimal places, up to 1,000,000.00
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn coupon_strategy() -> impl Strategy<Value = Option<Coupon>> {
    prop_oneof![
        Just(None),
        (0i64..=200).prop_map(|p| Some(Coupon::percentage("pct", Decimal::new(p, 0)))),
        amount_strategy().prop_map(|a| Some(Coupon::fixed("fix", a))),
        amount_strategy().prop_map(|a| {
            let mut c = Coupon::fixed("bad", a);
            c.discount_type = None;
            Some(c)
        }),
    ]
}

fn method_strategy() -> impl Strategy<Value = Option<PaymentMethod>> {
    prop_oneof![
        Just(None),
        Just(Some(PaymentMethod::promptpay())),
        Just(Some(PaymentMethod::card())),
        ((0i64..=1000), (0i64..=1000)).prop_map(|(rate, fixed)| Some(PaymentMethod::new(
            "custom",
            "Custom",
            Decimal::new(rate, 4),
            Decimal::new(fixed, 2),
        ))),
    ]
}

fn cart_strategy() -> impl Strategy<Value = Cart> {
    prop::collection::vec((amount_strategy(), 1u32..=20), 0..=8).prop_map(|lines| {
        let items = lines
            .into_iter()
            .enumerate()
            .map(|(i, (price, qty))| {
                LineItem::new(
                    format!("p{i}"),
                    format!("c{i}"),
                    price,
                    qty,
                    price * Decimal::from(qty),
                )
            })
            .collect();
        Cart::new("cart", items)
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn discount_is_bounded(subtotal in amount_strategy(), coupon in coupon_strategy()) {
        let d = discount(subtotal, coupon.as_ref());
        prop_assert!(d >= Decimal::ZERO);
        prop_assert!(d <= subtotal);
    }

    #[test]
    fn after_discount_non_increasing(
        subtotal in amount_strategy(),
        a in amount_strategy(),
        b in amount_strategy(),
    ) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let with_small = subtotal_after_discount(subtotal, small);
        let with_large = subtotal_after_discount(subtotal, large);
        prop_assert!(with_large <= with_small);
        prop_assert!(with_large >= Decimal::ZERO);
    }

    #[test]
    fn fee_is_whole_and_monotonic(
        a in amount_strategy(),
        b in amount_strategy(),
        method in method_strategy(),
    ) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let fee_small = payment_fee(small, method.as_ref());
        let fee_large = payment_fee(large, method.as_ref());
        prop_assert_eq!(fee_small, fee_small.trunc());
        prop_assert_eq!(fee_large, fee_large.trunc());
        prop_assert!(fee_small <= fee_large);
    }

    #[test]
    fn snapshot_invariants_and_idempotence(
        cart in cart_strategy(),
        coupon in coupon_strategy(),
        method in method_strategy(),
    ) {
        let first = PricingSnapshot::derive(&cart, coupon.as_ref(), method.as_ref());
        let second = PricingSnapshot::derive(&cart, coupon.as_ref(), method.as_ref());
        prop_assert_eq!(first, second);

        prop_assert!(first.discount <= first.subtotal_before_discount);
        prop_assert!(first.subtotal_after_discount >= Decimal::ZERO);
        prop_assert!(first.grand_total >= first.subtotal_after_discount);
        prop_assert_eq!(
            first.grand_total,
            first.subtotal_after_discount + first.payment_fee
        );
    }

    #[test]
    fn reconcile_keeps_selection_present_in_list(
        ids in prop::collection::vec("[a-z]{1,4}", 0..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let valid: Vec<Coupon> = ids.iter().map(|id| Coupon::fixed(id.clone(), Decimal::ONE)).collect();

        if valid.is_empty() {
            prop_assert!(reconcile_coupon(None, &valid).is_none());
        } else {
            let previous = pick.get(&valid).clone();
            let selected = reconcile_coupon(Some(&previous), &valid);
            prop_assert_eq!(selected.map(|c| c.id), Some(previous.id));
        }
    }

    #[test]
    fn reconcile_falls_back_to_first_when_previous_missing(
        ids in prop::collection::vec("[a-z]{1,4}", 0..6),
    ) {
        let valid: Vec<Coupon> = ids.iter().map(|id| Coupon::fixed(id.clone(), Decimal::ONE)).collect();
        let previous = Coupon::fixed("NOT-LISTED", Decimal::ONE);

        let selected = reconcile_coupon(Some(&previous), &valid);
        prop_assert_eq!(selected.map(|c| c.id), valid.first().map(|c| c.id.clone()));
    }
}
