//! Request and state types for the cart API.

use pigeon_commerce::prelude::*;
use serde::{Deserialize, Serialize};

/// A cart together with its concurrency token.
#[derive(Debug, Clone, PartialEq)]
pub struct CartState {
    /// The cart as last seen.
    pub cart: Cart,
    /// `ETag` from the last `GET /cart`, sent back as `If-Match`.
    pub etag: Option<String>,
}

/// Body of `POST /cart/items`.
///
/// Only `productId` and `quantity` go over the wire; the remaining fields
/// describe the optimistic line shown until the server confirms it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItem {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip)]
    pub seller_id: Option<SellerId>,
    #[serde(skip)]
    pub title: Option<String>,
    #[serde(skip)]
    pub unit_price: Option<Money>,
}

impl AddItem {
    /// Add `quantity` units of a product.
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            seller_id: None,
            title: None,
            unit_price: None,
        }
    }

    /// Price to show on the optimistic line.
    pub fn with_unit_price(mut self, unit_price: Money) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    /// Seller to show on the optimistic line.
    pub fn with_seller(mut self, seller_id: SellerId) -> Self {
        self.seller_id = Some(seller_id);
        self
    }

    /// Title to show on the optimistic line.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The optimistic line, carrying a temporary id.
    pub fn to_line(&self, currency: Currency) -> CartLine {
        let mut line = CartLine::new(
            ItemId::temporary(),
            self.product_id.clone(),
            self.quantity,
            self.unit_price.unwrap_or_else(|| Money::zero(currency)),
        );
        line.seller_id = self.seller_id.clone();
        line.title = self.title.clone();
        line
    }
}

/// Which lines a bulk removal targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveSelection {
    /// Every line (`?all=true`).
    All,
    /// The listed lines (`{itemIds}` body).
    Ids(Vec<ItemId>),
}

/// Body of a bulk removal by id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemoveItemsBody<'a> {
    pub item_ids: &'a [ItemId],
}

/// Body of `PUT /cart/items/{id}`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateQuantityBody {
    pub quantity: u32,
}

/// One line of a quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /cart/quote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub cart_id: CartId,
    pub items: Vec<QuoteItem>,
}

impl QuoteRequest {
    /// Quote the cart's current contents.
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            cart_id: cart.cart_id.clone(),
            items: cart
                .lines
                .iter()
                .map(|l| QuoteItem {
                    product_id: l.product_id.clone(),
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_item_wire_body() {
        let add = AddItem::new(ProductId::new("mouse"), 2)
            .with_unit_price(Money::pln(4999))
            .with_title("Mouse");
        let body = serde_json::to_value(&add).unwrap();
        assert_eq!(body, serde_json::json!({"productId": "mouse", "quantity": 2}));
    }

    #[test]
    fn test_add_item_line_is_temporary() {
        let line = AddItem::new(ProductId::new("mouse"), 1).to_line(Currency::PLN);
        assert!(line.item_id.is_temporary());
        assert_eq!(line.unit_price, Money::pln(0));
    }

    #[test]
    fn test_quote_request_from_cart() {
        let mut cart = Cart::new(CartId::new("c-1"));
        cart.push_line(CartLine::new(
            ItemId::new("a"),
            ProductId::new("p-1"),
            3,
            Money::pln(100),
        ));
        let body = serde_json::to_value(QuoteRequest::from_cart(&cart)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"cartId": "c-1", "items": [{"productId": "p-1", "quantity": 3}]})
        );
    }

    #[test]
    fn test_remove_body() {
        let ids = [ItemId::new("a"), ItemId::new("b")];
        let body = serde_json::to_value(RemoveItemsBody { item_ids: &ids }).unwrap();
        assert_eq!(body, serde_json::json!({"itemIds": ["a", "b"]}));
    }
}
