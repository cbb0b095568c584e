//! Cart and computed totals.

use crate::cart::pricing::cart_totals;
use crate::cart::CartLine;
use crate::error::CommerceError;
use crate::ids::{CartId, ItemId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Server-computed totals for a cart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComputedTotals {
    /// Sum of line totals.
    pub subtotal: Money,
    /// Delivery cost.
    pub delivery: Money,
    /// `subtotal + delivery`.
    pub total: Money,
}

impl ComputedTotals {
    /// All-zero totals in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            subtotal: Money::zero(currency),
            delivery: Money::zero(currency),
            total: Money::zero(currency),
        }
    }
}

/// A shopping cart as last seen by the client.
///
/// Lines keep insertion order, which is also display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart identifier.
    pub cart_id: CartId,
    /// Lines in the cart.
    #[serde(rename = "items", default)]
    pub lines: Vec<CartLine>,
    /// Totals computed by the server, or an optimistic approximation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<ComputedTotals>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(cart_id: CartId) -> Self {
        Self {
            cart_id,
            lines: Vec::new(),
            computed: None,
        }
    }

    /// Currency of the cart, taken from its first line.
    pub fn currency(&self) -> Currency {
        self.lines
            .first()
            .map(|l| l.unit_price.currency)
            .or_else(|| self.computed.map(|c| c.total.currency))
            .unwrap_or_default()
    }

    /// Append a line.
    pub fn push_line(&mut self, line: CartLine) {
        self.lines.push(line);
    }

    /// Get a line by id.
    pub fn line(&self, item_id: &ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.item_id == item_id)
    }

    /// Set a line's absolute quantity. Returns false if the line is absent.
    pub fn set_quantity(&mut self, item_id: &ItemId, quantity: u32) -> Result<bool, CommerceError> {
        match self.lines.iter_mut().find(|l| &l.item_id == item_id) {
            Some(line) => {
                line.set_quantity(quantity)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a line by id.
    pub fn remove_line(&mut self, item_id: &ItemId) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| &l.item_id != item_id);
        self.lines.len() < len_before
    }

    /// Remove every line whose id is listed. Returns how many were removed.
    pub fn remove_lines(&mut self, item_ids: &[ItemId]) -> usize {
        let len_before = self.lines.len();
        self.lines.retain(|l| !item_ids.contains(&l.item_id));
        len_before - self.lines.len()
    }

    /// Remove all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line still carries a client-generated id.
    pub fn has_temporary_lines(&self) -> bool {
        self.lines.iter().any(|l| l.item_id.is_temporary())
    }

    /// Recompute `computed` locally, keeping the last known delivery cost.
    ///
    /// Used to show an approximation while a mutation is in flight; the
    /// server's totals replace it on the next fetch.
    pub fn approximate_totals(&mut self) -> Result<(), CommerceError> {
        let currency = self.currency();
        let delivery = self
            .computed
            .map(|c| c.delivery)
            .unwrap_or_else(|| Money::zero(currency));
        self.computed = Some(cart_totals(&self.lines, delivery)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;

    fn cart_with(lines: &[(&str, u32, i64)]) -> Cart {
        let mut cart = Cart::new(CartId::new("cart-1"));
        for (id, qty, price) in lines {
            cart.push_line(CartLine::new(
                ItemId::new(*id),
                ProductId::new(format!("p-{}", id)),
                *qty,
                Money::pln(*price),
            ));
        }
        cart
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::new(CartId::new("cart-1"));
        assert!(cart.is_empty());
        assert_eq!(cart.currency(), Currency::PLN);
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = cart_with(&[("a", 1, 1000)]);
        assert!(cart.set_quantity(&ItemId::new("a"), 5).unwrap());
        assert_eq!(cart.item_count(), 5);
        assert!(!cart.set_quantity(&ItemId::new("missing"), 5).unwrap());
    }

    #[test]
    fn test_remove_lines_preserves_order() {
        let mut cart = cart_with(&[("a", 1, 100), ("b", 1, 200), ("c", 1, 300)]);
        assert_eq!(cart.remove_lines(&[ItemId::new("b"), ItemId::new("zzz")]), 1);
        let ids: Vec<&str> = cart.lines.iter().map(|l| l.item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(cart.remove_line(&ItemId::new("a")));
        assert!(!cart.remove_line(&ItemId::new("a")));
    }

    #[test]
    fn test_approximate_totals_keeps_delivery() {
        let mut cart = cart_with(&[("a", 2, 1000)]);
        cart.computed = Some(ComputedTotals {
            subtotal: Money::pln(2000),
            delivery: Money::pln(999),
            total: Money::pln(2999),
        });
        cart.set_quantity(&ItemId::new("a"), 3).unwrap();
        cart.approximate_totals().unwrap();

        let computed = cart.computed.unwrap();
        assert_eq!(computed.subtotal, Money::pln(3000));
        assert_eq!(computed.total, Money::pln(3999));
    }

    #[test]
    fn test_cart_wire_format() {
        let json = serde_json::json!({
            "cartId": "c-9",
            "items": [{
                "itemId": "i-1",
                "productId": "p-1",
                "quantity": 1,
                "price": {"amount": 500, "currency": "PLN"}
            }],
            "computed": {
                "subtotal": {"amount": 500, "currency": "PLN"},
                "delivery": {"amount": 0, "currency": "PLN"},
                "total": {"amount": 500, "currency": "PLN"}
            }
        });
        let cart: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.computed.unwrap().total, Money::pln(500));
    }
}
