//! # Money Types
//!
//! Amounts are exact decimals in major currency units (baht).
//! The external API sends plain JSON numbers and sometimes omits or nulls
//! them; the helpers here read those as zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A money amount in major units
pub type Amount = Decimal;

/// Display currency (ISO 4217); the storefront prices in baht
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    THB,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::THB => "thb",
        }
    }

    /// Returns the number of decimal places shown for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::THB => 2,
        }
    }

    /// Format an amount for display (e.g., "฿1,017.00")
    pub fn format(&self, amount: Amount) -> String {
        let rounded = amount.round_dp(self.decimal_places());
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.*}", self.decimal_places() as usize, rounded.abs());
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (text.as_str(), None),
        };

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let symbol = match self {
            Currency::THB => "฿",
        };
        let sign = if negative { "-" } else { "" };
        match fraction {
            Some(fraction) => format!("{sign}{symbol}{grouped}.{fraction}"),
            None => format!("{sign}{symbol}{grouped}"),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Deserialize a possibly-null field, falling back to `T::default()`.
///
/// Pair with `#[serde(default)]` so that absent fields are covered too.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thb() {
        assert_eq!(Currency::THB.format(Decimal::new(1017, 0)), "฿1,017.00");
        assert_eq!(Currency::THB.format(Decimal::new(3295, 2)), "฿32.95");
        assert_eq!(Currency::THB.format(Decimal::ZERO), "฿0.00");
    }

    #[test]
    fn test_format_grouping() {
        assert_eq!(Currency::THB.format(Decimal::new(123456789, 2)), "฿1,234,567.89");
        assert_eq!(Currency::THB.format(Decimal::new(100000, 0)), "฿100,000.00");
        assert_eq!(Currency::THB.format(Decimal::new(-50, 1)), "-฿5.00");
    }

    #[test]
    fn test_null_as_default() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "null_as_default")]
            amount: Amount,
        }

        let probe: Probe = serde_json::from_str(r#"{"amount": null}"#).unwrap();
        assert_eq!(probe.amount, Decimal::ZERO);

        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.amount, Decimal::ZERO);

        let probe: Probe = serde_json::from_str(r#"{"amount": 12.5}"#).unwrap();
        assert_eq!(probe.amount, Decimal::new(125, 1));
    }
}
