//! Cart lines and quantity bounds.

use crate::error::CommerceError;
use crate::ids::{ItemId, ProductId, SellerId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Default minimum quantity per line.
pub const DEFAULT_MIN_QUANTITY: u32 = 1;

/// Default maximum quantity per line.
pub const DEFAULT_MAX_QUANTITY: u32 = 99;

/// One product line in a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Line identifier (temporary until the server confirms the line).
    pub item_id: ItemId,
    /// Product on this line.
    pub product_id: ProductId,
    /// Seller fulfilling the line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<SellerId>,
    /// Product title (denormalized for display).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Quantity, within the product's [`QuantityBounds`].
    pub quantity: u32,
    /// Unit price.
    #[serde(rename = "price")]
    pub unit_price: Money,
    /// Catalogue price before promotion.
    #[serde(rename = "listPrice", default, skip_serializing_if = "Option::is_none")]
    pub list_unit_price: Option<Money>,
    /// Server-computed line total; takes precedence over recomputation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Money>,
}

impl CartLine {
    /// Create a line with no seller, title or list price.
    pub fn new(item_id: ItemId, product_id: ProductId, quantity: u32, unit_price: Money) -> Self {
        Self {
            item_id,
            product_id,
            seller_id: None,
            title: None,
            quantity,
            unit_price,
            list_unit_price: None,
            total_price: None,
        }
    }

    /// Set the seller.
    pub fn with_seller(mut self, seller_id: SellerId) -> Self {
        self.seller_id = Some(seller_id);
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the list price.
    pub fn with_list_price(mut self, list_unit_price: Money) -> Self {
        self.list_unit_price = Some(list_unit_price);
        self
    }

    /// Set an explicit total.
    pub fn with_total(mut self, total_price: Money) -> Self {
        self.total_price = Some(total_price);
        self
    }

    /// `unit_price × quantity`, ignoring any explicit total.
    pub fn computed_total(&self) -> Result<Money, CommerceError> {
        self.unit_price
            .try_multiply(i64::from(self.quantity))
            .ok_or(CommerceError::Overflow)
    }

    /// The line total: the explicit total when present, otherwise `unit_price × quantity`.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        match self.total_price {
            Some(total) => Ok(total),
            None => self.computed_total(),
        }
    }

    /// Savings against the list price: `(list - price) × quantity`, zero when
    /// there is no list price or it is not higher than the unit price.
    pub fn savings(&self) -> Result<Money, CommerceError> {
        let zero = Money::zero(self.unit_price.currency);
        let Some(list) = self.list_unit_price else {
            return Ok(zero);
        };
        let per_unit = list.try_subtract(&self.unit_price).ok_or_else(|| {
            CommerceError::CurrencyMismatch {
                expected: self.unit_price.currency.code().to_string(),
                got: list.currency.code().to_string(),
            }
        })?;
        if !per_unit.is_positive() {
            return Ok(zero);
        }
        per_unit
            .try_multiply(i64::from(self.quantity))
            .ok_or(CommerceError::Overflow)
    }

    /// Replace the quantity and recompute the line total from the unit price.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), CommerceError> {
        self.quantity = quantity;
        self.total_price = Some(self.computed_total()?);
        Ok(())
    }
}

/// Allowed quantity range for a product: `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityBounds {
    /// Smallest orderable quantity.
    pub min: u32,
    /// Largest orderable quantity.
    pub max: u32,
}

impl Default for QuantityBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_QUANTITY,
            max: DEFAULT_MAX_QUANTITY,
        }
    }
}

impl QuantityBounds {
    /// Create bounds, rejecting `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self, CommerceError> {
        if min > max {
            return Err(CommerceError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    /// Bounds from optional product metadata, defaulting to `[1, 99]` and
    /// capped by the stock available for ordering.
    pub fn for_product(min: Option<u32>, max: Option<u32>, max_orderable: Option<u32>) -> Self {
        let min = min.unwrap_or(DEFAULT_MIN_QUANTITY);
        let mut max = max.unwrap_or(DEFAULT_MAX_QUANTITY);
        if let Some(orderable) = max_orderable {
            max = max.min(orderable);
        }
        // Availability wins over the minimum.
        Self {
            min: min.min(max),
            max,
        }
    }

    /// Clip a requested quantity into range.
    pub fn clip(&self, quantity: u32) -> u32 {
        quantity.clamp(self.min, self.max)
    }

    /// Check a quantity without adjusting it.
    pub fn contains(&self, quantity: u32) -> bool {
        (self.min..=self.max).contains(&quantity)
    }

    /// Validate a quantity, returning an error when out of range.
    pub fn validate(&self, quantity: u32) -> Result<u32, CommerceError> {
        if self.contains(quantity) {
            Ok(quantity)
        } else {
            Err(CommerceError::QuantityOutOfRange {
                quantity,
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Stepper increment; stays at `max`.
    pub fn increment(&self, quantity: u32) -> u32 {
        self.clip(quantity.saturating_add(1))
    }

    /// Stepper decrement; stays at `min`.
    pub fn decrement(&self, quantity: u32) -> u32 {
        self.clip(quantity.saturating_sub(1))
    }
}
