//! # Storefront Error Types
//!
//! Typed error handling for the storefront cart and checkout flow.
//! All storefront operations return `Result<T, StorefrontError>`.

use thiserror::Error;

/// Core error type for all storefront operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorefrontError {
    /// Configuration errors (missing env vars, bad catalog file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Checkout attempted without a shipping address
    #[error("No shipping address selected")]
    MissingAddress,

    /// Checkout attempted without a payment method
    #[error("No payment method selected")]
    MissingPaymentMethod,

    /// Checkout attempted before the cart was loaded
    #[error("Cart has not been loaded")]
    CartNotLoaded,

    /// Selection of a coupon outside the current valid set
    #[error("Coupon is not valid for this cart: {coupon_id}")]
    CouponNotAvailable { coupon_id: String },

    /// Selection of a payment method missing from the catalog
    #[error("Unknown payment method: {method_id}")]
    UnknownPaymentMethod { method_id: String },

    /// Selection of an address missing from the address book
    #[error("Unknown address: {address_id}")]
    UnknownAddress { address_id: String },

    /// Mutation on a line that is not in the cart
    #[error("Line not in cart: {line_ref}")]
    LineNotFound { line_ref: String },

    /// Checkout attempted while the cart or its prices are still updating
    #[error("Cart is still updating, try again")]
    NotReady,

    /// Network/HTTP error reaching a collaborator
    #[error("Network error: {0}")]
    Network(String),

    /// Collaborator answered with a failure status on a read
    #[error("Fetch of {resource} failed: {message}")]
    FetchFailed { resource: String, message: String },

    /// Cart mutation refused by the backend (stock limits etc.)
    #[error("{message}")]
    Rejected { message: String },

    /// Checkout session creation failed
    #[error("Checkout creation failed: {0}")]
    CheckoutFailed(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification used by callers to decide how to surface an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Shown inline; nothing was sent
    Validation,
    /// A section failed to load and can be retried
    TransientFetch,
    /// The server refused a cart mutation; shown as a blocking notice
    Rejected,
    /// The gateway could not create a checkout session
    CheckoutFailed,
    /// Startup configuration problem
    Configuration,
}

impl StorefrontError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorefrontError::Network(_)
                | StorefrontError::FetchFailed { .. }
                | StorefrontError::CheckoutFailed(_)
        )
    }

    /// Classify this error into the storefront error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorefrontError::Configuration(_) => ErrorKind::Configuration,
            StorefrontError::MissingAddress
            | StorefrontError::MissingPaymentMethod
            | StorefrontError::CartNotLoaded
            | StorefrontError::CouponNotAvailable { .. }
            | StorefrontError::UnknownPaymentMethod { .. }
            | StorefrontError::UnknownAddress { .. }
            | StorefrontError::LineNotFound { .. }
            | StorefrontError::NotReady => ErrorKind::Validation,
            StorefrontError::Network(_)
            | StorefrontError::FetchFailed { .. }
            | StorefrontError::Serialization(_) => ErrorKind::TransientFetch,
            StorefrontError::Rejected { .. } => ErrorKind::Rejected,
            StorefrontError::CheckoutFailed(_) => ErrorKind::CheckoutFailed,
        }
    }

    /// True for errors raised before any request was sent
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// Result type alias for storefront operations
pub type StorefrontResult<T> = Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(StorefrontError::Network("timeout".into()).is_retryable());
        assert!(StorefrontError::FetchFailed {
            resource: "cart".into(),
            message: "HTTP 503".into()
        }
        .is_retryable());
        assert!(!StorefrontError::MissingAddress.is_retryable());
        assert!(!StorefrontError::Rejected {
            message: "out of stock".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(StorefrontError::MissingPaymentMethod.kind(), ErrorKind::Validation);
        assert_eq!(
            StorefrontError::Rejected {
                message: "x".into()
            }
            .kind(),
            ErrorKind::Rejected
        );
        assert_eq!(
            StorefrontError::CheckoutFailed("x".into()).kind(),
            ErrorKind::CheckoutFailed
        );
        assert!(StorefrontError::CouponNotAvailable {
            coupon_id: "c1".into()
        }
        .is_validation());
    }

    #[test]
    fn test_rejected_message_is_server_reason() {
        let err = StorefrontError::Rejected {
            message: "Only 2 left in stock".into(),
        };
        assert_eq!(err.to_string(), "Only 2 left in stock");
    }
}
