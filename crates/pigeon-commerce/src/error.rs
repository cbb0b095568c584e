//! Commerce error types.

use thiserror::Error;

/// Errors raised by cart domain rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Quantity outside the allowed range for the product.
    #[error("Quantity {quantity} outside allowed range [{min}, {max}]")]
    QuantityOutOfRange { quantity: u32, min: u32, max: u32 },

    /// Bounds where the minimum exceeds the maximum.
    #[error("Invalid quantity bounds: min {min} > max {max}")]
    InvalidBounds { min: u32, max: u32 },

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,
}
