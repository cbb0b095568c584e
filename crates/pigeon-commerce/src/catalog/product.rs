//! Product types as served by the catalogue API.

use crate::cart::QuantityBounds;
use crate::ids::{ProductId, SellerId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stock information for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Whether the product can be ordered at all.
    pub in_stock: bool,
    /// Most units one order may take. Zero means no stock-specific cap.
    pub max_orderable: u32,
}

/// A product in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Seller offering the product.
    pub seller_id: SellerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    /// Display title.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Free-form name/value attributes (size, color, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<HashMap<String, String>>,
    /// Current unit price.
    pub price: Money,
    /// Unit price before discount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_price: Option<Money>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub availability: Availability,
    /// Smallest quantity a line may hold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_qty: Option<u32>,
    /// Largest quantity a line may hold, before stock limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_qty: Option<u32>,
}

impl Product {
    /// Create an in-stock product with no quantity limits of its own.
    pub fn new(id: ProductId, seller_id: SellerId, title: impl Into<String>, price: Money) -> Self {
        Self {
            id,
            seller_id,
            seller_name: None,
            title: title.into(),
            image_url: None,
            attributes: Vec::new(),
            price,
            list_price: None,
            currency: price.currency,
            availability: Availability {
                in_stock: true,
                max_orderable: 0,
            },
            min_qty: None,
            max_qty: None,
        }
    }

    /// Set per-product quantity limits.
    pub fn with_quantity_limits(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_qty = min;
        self.max_qty = max;
        self
    }

    /// Set stock information.
    pub fn with_availability(mut self, in_stock: bool, max_orderable: u32) -> Self {
        self.availability = Availability {
            in_stock,
            max_orderable,
        };
        self
    }

    /// Set the pre-discount unit price.
    pub fn with_list_price(mut self, list_price: Money) -> Self {
        self.list_price = Some(list_price);
        self
    }

    /// Quantity range for a cart line holding this product.
    ///
    /// Missing limits fall back to `[1, 99]`; a zero `max_orderable` adds
    /// no cap.
    pub fn quantity_bounds(&self) -> QuantityBounds {
        let orderable = Some(self.availability.max_orderable).filter(|n| *n > 0);
        QuantityBounds::for_product(self.min_qty, self.max_qty, orderable)
    }

    /// Whether the list price is above the current price.
    pub fn is_discounted(&self) -> bool {
        self.list_price
            .is_some_and(|list| list.currency == self.price.currency && list.amount > self.price.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_wire_format() {
        let json = serde_json::json!({
            "id": "prod-001",
            "sellerId": "seller-1",
            "sellerName": "Test Seller",
            "title": "Test Product",
            "imageUrl": "https://example.com/image.jpg",
            "price": {"amount": 9999, "currency": "PLN"},
            "currency": "PLN",
            "availability": {"inStock": true, "maxOrderable": 10}
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.id.as_str(), "prod-001");
        assert_eq!(product.price, Money::pln(9999));
        assert_eq!(product.availability.max_orderable, 10);
        assert_eq!(product.min_qty, None);
        assert!(!product.is_discounted());
    }

    #[test]
    fn test_bounds_from_metadata() {
        let product = Product::new(
            ProductId::new("p"),
            SellerId::new("s"),
            "Mouse",
            Money::pln(4999),
        );
        assert_eq!(product.quantity_bounds(), QuantityBounds::default());

        let limited = product
            .clone()
            .with_quantity_limits(Some(2), Some(20))
            .with_availability(true, 5);
        let bounds = limited.quantity_bounds();
        assert_eq!((bounds.min, bounds.max), (2, 5));

        let uncapped = product.with_quantity_limits(None, Some(10)).with_availability(true, 0);
        let bounds = uncapped.quantity_bounds();
        assert_eq!((bounds.min, bounds.max), (1, 10));
    }

    #[test]
    fn test_discounted() {
        let product = Product::new(ProductId::new("p"), SellerId::new("s"), "Mouse", Money::pln(4000))
            .with_list_price(Money::pln(5000));
        assert!(product.is_discounted());
    }
}
