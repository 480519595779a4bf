//! # Pricing Engine
//!
//! Pure functions that turn a cart, a coupon selection and a payment method
//! selection into money amounts. Nothing here performs I/O or keeps state;
//! the same inputs always produce the same [`PricingSnapshot`].
//!
//! ```text
//! lines ──sum──▶ subtotal ──coupon──▶ discount ──▶ after discount ──fee──▶ grand total
//! ```
//!
//! Invariants:
//! - `0 <= discount <= subtotal_before_discount` (for a non-negative subtotal)
//! - `subtotal_after_discount >= 0`
//! - `payment_fee` is a whole number of currency units
//! - `grand_total >= subtotal_after_discount`

use crate::cart::Cart;
use crate::coupon::{Coupon, DiscountType};
use crate::money::Amount;
use crate::payment_method::PaymentMethod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sum of line totals; zero for an empty or unloaded cart
pub fn subtotal_before_discount(cart: &Cart) -> Amount {
    cart.items
        .iter()
        .fold(Decimal::ZERO, |acc, item| {
            acc.checked_add(item.line_total).unwrap_or(Decimal::MAX)
        })
}

/// Discount a coupon grants on `subtotal`, clamped to `[0, subtotal]`.
///
/// A missing coupon or one with an unrecognized discount type grants nothing.
pub fn discount(subtotal: Amount, coupon: Option<&Coupon>) -> Amount {
    let ceiling = subtotal.max(Decimal::ZERO);

    let raw = match coupon.and_then(|c| c.discount_type.map(|t| (t, c.discount_amount))) {
        Some((DiscountType::Percentage, percent)) => ceiling
            .checked_mul(percent)
            .map(|v| v / Decimal::ONE_HUNDRED)
            // only overflows for huge percentages, which clamp to the ceiling anyway
            .unwrap_or(if percent.is_sign_negative() { Decimal::ZERO } else { ceiling }),
        Some((DiscountType::Fixed, amount)) => amount,
        None => Decimal::ZERO,
    };

    raw.max(Decimal::ZERO).min(ceiling)
}

/// Subtotal left after the discount; never negative
pub fn subtotal_after_discount(subtotal: Amount, discount: Amount) -> Amount {
    (subtotal - discount).max(Decimal::ZERO)
}

/// Processing fee for `amount` under `method`, rounded up to a whole unit.
///
/// The fixed fee is added before rounding: `ceil(amount * rate + fixed)`.
pub fn payment_fee(amount: Amount, method: Option<&PaymentMethod>) -> Amount {
    let Some(method) = method else {
        return Decimal::ZERO;
    };

    amount
        .checked_mul(method.fee_rate)
        .and_then(|v| v.checked_add(method.fixed_fee))
        .unwrap_or(Decimal::MAX)
        .ceil()
        .max(Decimal::ZERO)
}

/// Amount charged: subtotal after discount plus the payment fee
pub fn grand_total(subtotal_after_discount: Amount, payment_fee: Amount) -> Amount {
    subtotal_after_discount
        .checked_add(payment_fee)
        .unwrap_or(Decimal::MAX)
}

/// Pick the coupon selection after the valid-coupon list changed.
///
/// Keeps the previous choice if a coupon with the same id is still offered
/// (returning the freshly listed copy), otherwise falls back to the first
/// offered coupon, otherwise to no coupon.
pub fn reconcile_coupon(previous: Option<&Coupon>, valid: &[Coupon]) -> Option<Coupon> {
    previous
        .and_then(|prev| valid.iter().find(|c| c.id == prev.id))
        .or_else(|| valid.first())
        .cloned()
}

/// Every derived amount for one set of selections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PricingSnapshot {
    pub subtotal_before_discount: Amount,
    pub discount: Amount,
    pub subtotal_after_discount: Amount,
    pub payment_fee: Amount,
    pub grand_total: Amount,
}

impl PricingSnapshot {
    /// All-zero snapshot (empty or unloaded cart, nothing selected)
    pub fn zero() -> Self {
        Self::default()
    }

    /// Derive the full snapshot from the current selections
    pub fn derive(cart: &Cart, coupon: Option<&Coupon>, method: Option<&PaymentMethod>) -> Self {
        let before = subtotal_before_discount(cart);
        let discount = discount(before, coupon);
        let after = subtotal_after_discount(before, discount);
        let fee = payment_fee(after, method);

        Self {
            subtotal_before_discount: before,
            discount,
            subtotal_after_discount: after,
            payment_fee: fee,
            grand_total: grand_total(after, fee),
        }
    }

    /// True if a coupon actually reduced the price
    pub fn has_discount(&self) -> bool {
        self.discount > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::LineItem;

    fn cart_with_subtotal(subtotal: i64) -> Cart {
        Cart::new(
            "cart-1",
            vec![LineItem::new(
                "p1",
                "c1",
                Decimal::new(subtotal, 0),
                1,
                Decimal::new(subtotal, 0),
            )],
        )
    }

    #[test]
    fn test_scenario_a_promptpay_no_coupon() {
        let cart = cart_with_subtotal(1000);
        let method = PaymentMethod::promptpay();

        let snapshot = PricingSnapshot::derive(&cart, None, Some(&method));

        assert_eq!(snapshot.subtotal_before_discount, Decimal::new(1000, 0));
        assert_eq!(snapshot.discount, Decimal::ZERO);
        assert_eq!(snapshot.payment_fee, Decimal::new(17, 0)); // ceil(16.5)
        assert_eq!(snapshot.grand_total, Decimal::new(1017, 0));
    }

    #[test]
    fn test_scenario_b_percentage_coupon_card() {
        let cart = cart_with_subtotal(1000);
        let coupon = Coupon::percentage("ten", Decimal::TEN);
        let method = PaymentMethod::card();

        let snapshot = PricingSnapshot::derive(&cart, Some(&coupon), Some(&method));

        assert_eq!(snapshot.discount, Decimal::new(100, 0));
        assert_eq!(snapshot.subtotal_after_discount, Decimal::new(900, 0));
        assert_eq!(snapshot.payment_fee, Decimal::new(33, 0)); // ceil(32.95)
        assert_eq!(snapshot.grand_total, Decimal::new(933, 0));
    }

    #[test]
    fn test_scenario_c_fixed_coupon_clamped() {
        let cart = cart_with_subtotal(1000);
        let coupon = Coupon::fixed("big", Decimal::new(2000, 0));
        let method = PaymentMethod::card();

        let snapshot = PricingSnapshot::derive(&cart, Some(&coupon), Some(&method));

        assert_eq!(snapshot.discount, Decimal::new(1000, 0));
        assert_eq!(snapshot.subtotal_after_discount, Decimal::ZERO);
        assert_eq!(snapshot.payment_fee, Decimal::ONE); // ceil(0 + 0.1)
        assert_eq!(snapshot.grand_total, Decimal::ONE);
    }

    #[test]
    fn test_scenario_d_empty_cart() {
        let snapshot = PricingSnapshot::derive(
            &Cart::empty(),
            Some(&Coupon::fixed("f", Decimal::TEN)),
            None,
        );
        assert_eq!(snapshot, PricingSnapshot::zero());
    }

    #[test]
    fn test_empty_cart_with_promptpay_is_zero() {
        let snapshot =
            PricingSnapshot::derive(&Cart::empty(), None, Some(&PaymentMethod::promptpay()));
        assert_eq!(snapshot.grand_total, Decimal::ZERO);
        assert_eq!(snapshot.payment_fee, Decimal::ZERO);
    }

    #[test]
    fn test_malformed_coupon_grants_nothing() {
        let mut coupon = Coupon::fixed("x", Decimal::new(50, 0));
        coupon.discount_type = None;

        assert_eq!(discount(Decimal::new(1000, 0), Some(&coupon)), Decimal::ZERO);
        assert_eq!(discount(Decimal::new(1000, 0), None), Decimal::ZERO);
    }

    #[test]
    fn test_negative_coupon_amount_clamps_to_zero() {
        let coupon = Coupon::fixed("neg", Decimal::new(-50, 0));
        assert_eq!(discount(Decimal::new(1000, 0), Some(&coupon)), Decimal::ZERO);

        let coupon = Coupon::percentage("neg", Decimal::new(-10, 0));
        assert_eq!(discount(Decimal::new(1000, 0), Some(&coupon)), Decimal::ZERO);
    }

    #[test]
    fn test_percentage_over_hundred_clamps_to_subtotal() {
        let coupon = Coupon::percentage("all", Decimal::new(150, 0));
        assert_eq!(
            discount(Decimal::new(80, 0), Some(&coupon)),
            Decimal::new(80, 0)
        );
    }

    #[test]
    fn test_subtotal_uses_line_totals_verbatim() {
        // store-reported total wins over unit price x quantity
        let cart = Cart::new(
            "c",
            vec![
                LineItem::new("p1", "c1", Decimal::new(100, 0), 3, Decimal::new(250, 0)),
                LineItem::new("p2", "c2", Decimal::new(1999, 2), 1, Decimal::new(1999, 2)),
            ],
        );
        assert_eq!(subtotal_before_discount(&cart), Decimal::new(26999, 2));
    }

    #[test]
    fn test_fee_without_method_is_zero() {
        assert_eq!(payment_fee(Decimal::new(1000, 0), None), Decimal::ZERO);
    }

    #[test]
    fn test_fee_joint_rounding() {
        // 0.5 + 0.1 rounds once to 1, not ceil(0.5) + 0.1 = 1.1
        let method = PaymentMethod::new("m", "M", Decimal::new(5, 3), Decimal::new(1, 1));
        assert_eq!(payment_fee(Decimal::new(100, 0), Some(&method)), Decimal::ONE);
    }

    #[test]
    fn test_fee_exact_integer_not_bumped() {
        // 1000 * 0.02 is exactly 20; no float drift to 21
        let method = PaymentMethod::new("m", "M", Decimal::new(2, 2), Decimal::ZERO);
        assert_eq!(
            payment_fee(Decimal::new(1000, 0), Some(&method)),
            Decimal::new(20, 0)
        );
    }

    #[test]
    fn test_reconcile_keeps_previous_when_still_valid() {
        let previous = Coupon::fixed("b", Decimal::TEN);
        let valid = vec![
            Coupon::fixed("a", Decimal::ONE),
            Coupon::fixed("b", Decimal::new(20, 0)),
        ];

        let selected = reconcile_coupon(Some(&previous), &valid).unwrap();
        assert_eq!(selected.id, "b");
        // fresh copy from the new list
        assert_eq!(selected.discount_amount, Decimal::new(20, 0));
    }

    #[test]
    fn test_reconcile_falls_back_to_first() {
        let previous = Coupon::fixed("gone", Decimal::TEN);
        let valid = vec![Coupon::fixed("a", Decimal::ONE), Coupon::fixed("b", Decimal::ONE)];

        assert_eq!(reconcile_coupon(Some(&previous), &valid).unwrap().id, "a");
        assert_eq!(reconcile_coupon(None, &valid).unwrap().id, "a");
    }

    #[test]
    fn test_reconcile_empty_list_selects_none() {
        let previous = Coupon::fixed("a", Decimal::TEN);
        assert!(reconcile_coupon(Some(&previous), &[]).is_none());
        assert!(reconcile_coupon(None, &[]).is_none());
    }
}
