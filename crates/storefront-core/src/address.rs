//! Shipping addresses from the customer's address book.

use crate::money::null_as_default;
use serde::{Deserialize, Serialize};

/// A shipping address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(rename = "fullname", default, deserialize_with = "null_as_default")]
    pub recipient_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,

    #[serde(rename = "address", default, deserialize_with = "null_as_default")]
    pub line1: String,

    #[serde(rename = "tambon", default, deserialize_with = "null_as_default")]
    pub subdistrict: String,

    #[serde(rename = "amphure", default, deserialize_with = "null_as_default")]
    pub district: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub province: String,

    #[serde(rename = "zip_code", default, deserialize_with = "null_as_default")]
    pub postal_code: String,
}

impl Address {
    /// Create an address with only an ID and recipient
    pub fn new(id: impl Into<String>, recipient_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            recipient_name: recipient_name.into(),
            phone: String::new(),
            line1: String::new(),
            subdistrict: String::new(),
            district: String::new(),
            province: String::new(),
            postal_code: String::new(),
        }
    }

    /// One-line summary used in pickers
    pub fn summary(&self) -> String {
        [
            self.line1.as_str(),
            self.subdistrict.as_str(),
            self.district.as_str(),
            self.province.as_str(),
            self.postal_code.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}
