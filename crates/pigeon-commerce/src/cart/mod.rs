//! Shopping cart module.
//!
//! Contains cart lines, quantity bounds, pricing and selection aggregation.

mod cart;
mod line;
mod pricing;
mod seller;

pub use cart::{Cart, ComputedTotals};
pub use line::{CartLine, QuantityBounds, DEFAULT_MAX_QUANTITY, DEFAULT_MIN_QUANTITY};
pub use pricing::{
    aggregate, cart_totals, line_pricing, total_savings, LinePricing, SelectionSummary,
};
pub use seller::{group_by_seller, SellerGroup};
