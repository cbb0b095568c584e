//! Cart domain types and pricing logic for Pigeon.
//!
//! - **Money**: integer minor units with a currency, formatted only at the
//!   presentation boundary
//! - **Cart**: lines, quantity bounds, computed totals
//! - **Pricing**: line totals, savings, selection aggregation, seller grouping
//! - **Catalog**: products and the quantity limits they impose on cart lines
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashSet;
//! use pigeon_commerce::prelude::*;
//!
//! let mut cart = Cart::new(CartId::new("cart-1"));
//! cart.push_line(CartLine::new(
//!     ItemId::new("a"),
//!     ProductId::new("mouse"),
//!     2,
//!     Money::pln(4999),
//! ));
//!
//! let selected: HashSet<ItemId> = [ItemId::new("a")].into_iter().collect();
//! let summary = aggregate(&cart.lines, &selected).unwrap();
//! assert_eq!(summary.selected_total.display(), "99,98 z\u{142}");
//! ```

pub mod error;
pub mod format;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::format::{format_decimal, format_pln, DecimalStyle};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::cart::{
        aggregate, cart_totals, group_by_seller, total_savings, Cart, CartLine, ComputedTotals,
        QuantityBounds, SelectionSummary, SellerGroup,
    };
    pub use crate::catalog::{Availability, Product};
}
