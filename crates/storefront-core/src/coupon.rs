//! # Coupon Types
//!
//! Coupons as listed by the Coupon Service. The service only returns
//! coupons that are valid for the subtotal it was asked about.

use crate::money::{null_as_default, Amount};
use serde::{Deserialize, Deserializer, Serialize};

/// How a coupon's `discount_amount` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_amount` percent of the subtotal
    Percentage,
    /// `discount_amount` off, in currency units
    Fixed,
}

impl DiscountType {
    /// Parse the wire tag; anything unrecognized yields `None`
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "percentage" => Some(DiscountType::Percentage),
            "fixed" => Some(DiscountType::Fixed),
            _ => None,
        }
    }
}

/// Unknown or non-string tags become `None` instead of failing the whole list.
fn lenient_discount_type<'de, D>(deserializer: D) -> Result<Option<DiscountType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(DiscountType::parse))
}

/// A discount offered to the customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Coupon ID
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Customer-facing code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Discount type; `None` when the service sent an unknown tag
    #[serde(default, deserialize_with = "lenient_discount_type")]
    pub discount_type: Option<DiscountType>,

    /// Percentage points or currency units, depending on `discount_type`
    #[serde(default, deserialize_with = "null_as_default")]
    pub discount_amount: Amount,
}

impl Coupon {
    /// Create a percentage coupon
    pub fn percentage(id: impl Into<String>, percent: Amount) -> Self {
        Self {
            id: id.into(),
            code: None,
            discount_type: Some(DiscountType::Percentage),
            discount_amount: percent,
        }
    }

    /// Create a fixed-amount coupon
    pub fn fixed(id: impl Into<String>, amount: Amount) -> Self {
        Self {
            id: id.into(),
            code: None,
            discount_type: Some(DiscountType::Fixed),
            discount_amount: amount,
        }
    }

    /// Builder: set code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Check whether the discount type was recognized
    pub fn is_well_formed(&self) -> bool {
        self.discount_type.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_coupon_list_from_json() {
        let json = r#"[
            {"_id": "a", "code": "SAVE10", "discount_type": "percentage", "discount_amount": 10},
            {"_id": "b", "discount_type": "fixed", "discount_amount": 150.5}
        ]"#;

        let coupons: Vec<Coupon> = serde_json::from_str(json).unwrap();
        assert_eq!(coupons.len(), 2);
        assert_eq!(coupons[0].discount_type, Some(DiscountType::Percentage));
        assert_eq!(coupons[0].code.as_deref(), Some("SAVE10"));
        assert_eq!(coupons[1].discount_type, Some(DiscountType::Fixed));
        assert_eq!(coupons[1].discount_amount, Decimal::new(1505, 1));
    }

    #[test]
    fn test_unknown_discount_type_is_malformed() {
        let json = r#"{"_id": "x", "discount_type": "bogo", "discount_amount": 50}"#;
        let coupon: Coupon = serde_json::from_str(json).unwrap();
        assert!(!coupon.is_well_formed());

        let json = r#"{"_id": "y", "discount_type": 3}"#;
        let coupon: Coupon = serde_json::from_str(json).unwrap();
        assert!(coupon.discount_type.is_none());
        assert_eq!(coupon.discount_amount, Decimal::ZERO);
    }
}
