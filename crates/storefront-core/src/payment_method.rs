//! # Payment Methods
//!
//! Locally defined payment methods and their processing fees.
//! The catalog is static; it can be overridden from a TOML file.

use crate::money::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A way to pay, with the fee the platform passes on to the customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Method identifier sent to the gateway (e.g., "promptpay", "card")
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Proportional fee (0.0365 = 3.65%)
    #[serde(default)]
    pub fee_rate: Amount,

    /// Flat fee per payment, in currency units
    #[serde(default)]
    pub fixed_fee: Amount,
}

impl PaymentMethod {
    /// Create a payment method
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        fee_rate: Amount,
        fixed_fee: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            fee_rate,
            fixed_fee,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// QR PromptPay: 1.65%, no flat fee
    pub fn promptpay() -> Self {
        Self::new("promptpay", "QR PromptPay", Decimal::new(165, 4), Decimal::ZERO)
            .with_description("Pay by QR code from any Thai bank app")
    }

    /// Credit/debit card: 3.65% plus 0.10
    pub fn card() -> Self {
        Self::new("card", "Credit/Debit Card", Decimal::new(365, 4), Decimal::new(1, 1))
            .with_description("VISA and MasterCard only")
    }
}

/// Payment method catalog (built in, or loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentMethodCatalog {
    #[serde(default)]
    pub methods: Vec<PaymentMethod>,
}

impl PaymentMethodCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            methods: Vec::new(),
        }
    }

    /// The storefront's standard methods, PromptPay first
    pub fn builtin() -> Self {
        Self {
            methods: vec![PaymentMethod::promptpay(), PaymentMethod::card()],
        }
    }

    /// Add a method to the catalog
    pub fn add(&mut self, method: PaymentMethod) {
        self.methods.push(method);
    }

    /// Find a method by ID
    pub fn get(&self, id: &str) -> Option<&PaymentMethod> {
        self.methods.iter().find(|m| m.id == id)
    }

    /// Method preselected for a new session
    pub fn default_method(&self) -> Option<&PaymentMethod> {
        self.methods.first()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = PaymentMethodCatalog::builtin();

        assert_eq!(catalog.default_method().map(|m| m.id.as_str()), Some("promptpay"));

        let card = catalog.get("card").unwrap();
        assert_eq!(card.fee_rate, Decimal::new(365, 4));
        assert_eq!(card.fixed_fee, Decimal::new(1, 1));
        assert!(catalog.get("paypal").is_none());
    }

    #[test]
    fn test_catalog_from_toml() {
        let toml_str = r#"
            [[methods]]
            id = "bank"
            name = "Bank Transfer"
            fee_rate = 0.0
            fixed_fee = 15

            [[methods]]
            id = "card"
            name = "Card"
            fee_rate = 0.029
        "#;

        let catalog = PaymentMethodCatalog::from_toml(toml_str).unwrap();
        assert_eq!(catalog.methods.len(), 2);

        let bank = catalog.get("bank").unwrap();
        assert_eq!(bank.fixed_fee, Decimal::new(15, 0));

        let card = catalog.get("card").unwrap();
        assert_eq!(card.fee_rate, Decimal::new(29, 3));
        assert_eq!(card.fixed_fee, Decimal::ZERO);
    }
}
