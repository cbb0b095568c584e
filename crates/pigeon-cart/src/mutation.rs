//! Cart mutations and their speculative effect on a cached cart.

use crate::types::{AddItem, RemoveSelection};
use pigeon_commerce::prelude::*;

/// A change the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum CartMutation {
    /// Add a product.
    AddItem(AddItem),
    /// Set a line's absolute quantity.
    UpdateQuantity { item_id: ItemId, quantity: u32 },
    /// Drop one line.
    RemoveItem(ItemId),
    /// Drop several lines, or all of them.
    RemoveItems(RemoveSelection),
}

impl CartMutation {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddItem(_) => "add_item",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::RemoveItem(_) => "remove_item",
            Self::RemoveItems(RemoveSelection::All) => "clear",
            Self::RemoveItems(RemoveSelection::Ids(_)) => "remove_items",
        }
    }

    /// Product whose quantity the mutation sets, looked up in `cart` for
    /// updates.
    pub fn product_id<'a>(&'a self, cart: Option<&'a Cart>) -> Option<&'a ProductId> {
        match self {
            Self::AddItem(add) => Some(&add.product_id),
            Self::UpdateQuantity { item_id, .. } => {
                cart.and_then(|c| c.line(item_id)).map(|l| &l.product_id)
            }
            Self::RemoveItem(_) | Self::RemoveItems(_) => None,
        }
    }

    /// Reject the mutation before anything is sent or shown.
    pub fn validate(&self, bounds: &QuantityBounds) -> Result<(), CommerceError> {
        match self {
            Self::AddItem(add) => bounds.validate(add.quantity).map(|_| ()),
            Self::UpdateQuantity { quantity, .. } => bounds.validate(*quantity).map(|_| ()),
            Self::RemoveItem(_) | Self::RemoveItems(_) => Ok(()),
        }
    }

    /// Apply the expected outcome to a local copy of the cart.
    ///
    /// Totals are re-approximated so the displayed summary follows the
    /// change; the server's figures replace them on the next fetch. Updating
    /// or removing a line that is not in the cart leaves it unchanged.
    pub fn apply(&self, cart: &mut Cart) -> Result<(), CommerceError> {
        match self {
            Self::AddItem(add) => {
                let line = add.to_line(cart.currency());
                cart.push_line(line);
            }
            Self::UpdateQuantity { item_id, quantity } => {
                cart.set_quantity(item_id, *quantity)?;
            }
            Self::RemoveItem(item_id) => {
                cart.remove_line(item_id);
            }
            Self::RemoveItems(RemoveSelection::All) => cart.clear(),
            Self::RemoveItems(RemoveSelection::Ids(ids)) => {
                cart.remove_lines(ids);
            }
        }
        cart.approximate_totals()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Cart {
        let mut cart = Cart::new(CartId::new("c-1"));
        cart.push_line(CartLine::new(
            ItemId::new("a"),
            ProductId::new("p-a"),
            2,
            Money::pln(1000),
        ));
        cart.push_line(CartLine::new(
            ItemId::new("b"),
            ProductId::new("p-b"),
            1,
            Money::pln(500),
        ));
        cart
    }

    #[test]
    fn test_add_appends_temporary_line() {
        let mut cart = cart();
        let add = AddItem::new(ProductId::new("p-c"), 1).with_unit_price(Money::pln(250));
        CartMutation::AddItem(add).apply(&mut cart).unwrap();

        assert_eq!(cart.lines.len(), 3);
        assert!(cart.lines[2].item_id.is_temporary());
        assert_eq!(cart.computed.unwrap().subtotal, Money::pln(2750));
    }

    #[test]
    fn test_update_sets_quantity_and_total() {
        let mut cart = cart();
        CartMutation::UpdateQuantity {
            item_id: ItemId::new("b"),
            quantity: 4,
        }
        .apply(&mut cart)
        .unwrap();
        let line = cart.line(&ItemId::new("b")).unwrap();
        assert_eq!(line.quantity, 4);
        assert_eq!(line.total_price, Some(Money::pln(2000)));
    }

    #[test]
    fn test_remove_variants() {
        let mut one = cart();
        CartMutation::RemoveItem(ItemId::new("a")).apply(&mut one).unwrap();
        assert_eq!(one.lines.len(), 1);

        let mut some = cart();
        CartMutation::RemoveItems(RemoveSelection::Ids(vec![ItemId::new("a"), ItemId::new("b")]))
            .apply(&mut some)
            .unwrap();
        assert!(some.is_empty());

        let mut all = cart();
        CartMutation::RemoveItems(RemoveSelection::All)
            .apply(&mut all)
            .unwrap();
        assert!(all.is_empty());
        assert_eq!(all.computed.unwrap().total, Money::pln(0));
    }

    #[test]
    fn test_validate_quantity() {
        let bounds = QuantityBounds::default();
        let too_many = CartMutation::UpdateQuantity {
            item_id: ItemId::new("a"),
            quantity: 100,
        };
        assert!(too_many.validate(&bounds).is_err());
        assert!(CartMutation::AddItem(AddItem::new(ProductId::new("p"), 0))
            .validate(&bounds)
            .is_err());
        assert!(CartMutation::RemoveItem(ItemId::new("a")).validate(&bounds).is_ok());
        assert_eq!(CartMutation::RemoveItems(RemoveSelection::All).name(), "clear");

        let narrow = QuantityBounds::new(1, 5).unwrap();
        let six = CartMutation::UpdateQuantity {
            item_id: ItemId::new("a"),
            quantity: 6,
        };
        assert!(six.validate(&narrow).is_err());
    }

    #[test]
    fn test_product_id_of_mutation() {
        let cart = cart();
        let update = CartMutation::UpdateQuantity {
            item_id: ItemId::new("b"),
            quantity: 2,
        };
        assert_eq!(update.product_id(Some(&cart)).map(|p| p.as_str()), Some("p-b"));
        assert_eq!(update.product_id(None), None);

        let add = CartMutation::AddItem(AddItem::new(ProductId::new("p-c"), 1));
        assert_eq!(add.product_id(None).map(|p| p.as_str()), Some("p-c"));
        assert_eq!(CartMutation::RemoveItem(ItemId::new("a")).product_id(Some(&cart)), None);
    }
}
