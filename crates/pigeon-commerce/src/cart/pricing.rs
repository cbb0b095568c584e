//! Cart pricing and selection aggregation.

use std::collections::HashSet;

use crate::cart::{CartLine, ComputedTotals};
use crate::error::CommerceError;
use crate::ids::ItemId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Pricing breakdown for a single line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinePricing {
    /// Line id.
    pub item_id: ItemId,
    /// Unit price.
    pub unit_price: Money,
    /// Quantity.
    pub quantity: u32,
    /// Line total (explicit total or `unit_price × quantity`).
    pub total: Money,
    /// Savings against the list price.
    pub savings: Money,
}

/// Totals for the lines a user has selected for checkout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionSummary {
    /// Number of cart lines that matched the selection.
    pub selected_count: usize,
    /// Sum of the matched lines' totals.
    pub selected_total: Money,
}

/// Per-line pricing for display.
pub fn line_pricing(lines: &[CartLine]) -> Result<Vec<LinePricing>, CommerceError> {
    lines
        .iter()
        .map(|line| {
            Ok(LinePricing {
                item_id: line.item_id.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
                total: line.line_total()?,
                savings: line.savings()?,
            })
        })
        .collect()
}

/// Client-side approximation of the server totals:
/// `subtotal = Σ line totals`, `total = subtotal + delivery`.
pub fn cart_totals(lines: &[CartLine], delivery: Money) -> Result<ComputedTotals, CommerceError> {
    let subtotal = sum_lines(lines.iter(), delivery.currency, CartLine::line_total)?;
    let total = subtotal
        .try_add(&delivery)
        .ok_or_else(|| mismatch(subtotal.currency, delivery.currency))?;
    Ok(ComputedTotals {
        subtotal,
        delivery,
        total,
    })
}

/// Sum of per-line savings.
pub fn total_savings(lines: &[CartLine], currency: Currency) -> Result<Money, CommerceError> {
    sum_lines(lines.iter(), currency, CartLine::savings)
}

/// Aggregate the selected lines.
///
/// Each line whose id is in `selected` contributes its [`CartLine::line_total`].
/// Ids that no longer exist in the cart are ignored, so `selected_count`
/// counts matched lines rather than the size of `selected`.
pub fn aggregate(
    lines: &[CartLine],
    selected: &HashSet<ItemId>,
) -> Result<SelectionSummary, CommerceError> {
    let matched: Vec<&CartLine> = lines
        .iter()
        .filter(|l| selected.contains(&l.item_id))
        .collect();

    // Unselected lines never decide the currency of the sum.
    let currency = matched
        .first()
        .copied()
        .or_else(|| lines.first())
        .map(|l| l.unit_price.currency)
        .unwrap_or_default();

    Ok(SelectionSummary {
        selected_count: matched.len(),
        selected_total: sum_lines(matched.into_iter(), currency, CartLine::line_total)?,
    })
}

fn sum_lines<'a>(
    lines: impl Iterator<Item = &'a CartLine>,
    currency: Currency,
    value: impl Fn(&CartLine) -> Result<Money, CommerceError>,
) -> Result<Money, CommerceError> {
    let mut acc = Money::zero(currency);
    for line in lines {
        let amount = value(line)?;
        acc = match acc.try_add(&amount) {
            Some(sum) => sum,
            None if acc.currency != amount.currency => {
                return Err(mismatch(acc.currency, amount.currency))
            }
            None => return Err(CommerceError::Overflow),
        };
    }
    Ok(acc)
}

fn mismatch(expected: Currency, got: Currency) -> CommerceError {
    CommerceError::CurrencyMismatch {
        expected: expected.code().to_string(),
        got: got.code().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;

    fn sample_lines() -> Vec<CartLine> {
        vec![
            CartLine::new(ItemId::new("a"), ProductId::new("p-a"), 2, Money::pln(1000))
                .with_total(Money::pln(2000)),
            CartLine::new(ItemId::new("b"), ProductId::new("p-b"), 1, Money::pln(500)),
        ]
    }

    fn ids(values: &[&str]) -> HashSet<ItemId> {
        values.iter().map(|v| ItemId::new(*v)).collect()
    }

    #[test]
    fn test_aggregate_selected_lines() {
        let summary = aggregate(&sample_lines(), &ids(&["a", "b"])).unwrap();
        assert_eq!(summary.selected_total, Money::pln(2500));
        assert_eq!(summary.selected_count, 2);
    }

    #[test]
    fn test_aggregate_empty_selection() {
        let summary = aggregate(&sample_lines(), &ids(&[])).unwrap();
        assert_eq!(summary.selected_total, Money::pln(0));
        assert_eq!(summary.selected_count, 0);
    }

    #[test]
    fn test_aggregate_ignores_stale_ids() {
        let summary = aggregate(&sample_lines(), &ids(&["z"])).unwrap();
        assert_eq!(summary.selected_total, Money::pln(0));
        assert_eq!(summary.selected_count, 0);

        let summary = aggregate(&sample_lines(), &ids(&["b", "z"])).unwrap();
        assert_eq!(summary.selected_count, 1);
        assert_eq!(summary.selected_total, Money::pln(500));
    }

    #[test]
    fn test_aggregate_prefers_explicit_total() {
        let lines = vec![
            CartLine::new(ItemId::new("a"), ProductId::new("p"), 3, Money::pln(1000))
                .with_total(Money::pln(2700)),
        ];
        let summary = aggregate(&lines, &ids(&["a"])).unwrap();
        assert_eq!(summary.selected_total, Money::pln(2700));
    }

    #[test]
    fn test_aggregate_rejects_mixed_currencies() {
        let lines = vec![
            CartLine::new(ItemId::new("a"), ProductId::new("p"), 1, Money::pln(100)),
            CartLine::new(
                ItemId::new("b"),
                ProductId::new("q"),
                1,
                Money::new(100, Currency::EUR),
            ),
        ];
        assert!(matches!(
            aggregate(&lines, &ids(&["a", "b"])),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_aggregate_uses_currency_of_selected_lines() {
        let lines = vec![
            CartLine::new(
                ItemId::new("eur"),
                ProductId::new("p"),
                1,
                Money::new(100, Currency::EUR),
            ),
            CartLine::new(ItemId::new("a"), ProductId::new("q"), 2, Money::pln(300)),
            CartLine::new(ItemId::new("b"), ProductId::new("r"), 1, Money::pln(150)),
        ];
        let summary = aggregate(&lines, &ids(&["a", "b"])).unwrap();
        assert_eq!(summary.selected_count, 2);
        assert_eq!(summary.selected_total, Money::pln(750));
    }

    #[test]
    fn test_cart_totals() {
        let totals = cart_totals(&sample_lines(), Money::pln(1499)).unwrap();
        assert_eq!(totals.subtotal, Money::pln(2500));
        assert_eq!(totals.total, Money::pln(3999));
    }

    #[test]
    fn test_total_savings_and_line_pricing() {
        let lines = vec![
            CartLine::new(ItemId::new("a"), ProductId::new("p"), 2, Money::pln(800))
                .with_list_price(Money::pln(1000)),
            CartLine::new(ItemId::new("b"), ProductId::new("q"), 1, Money::pln(500)),
        ];
        assert_eq!(total_savings(&lines, Currency::PLN).unwrap(), Money::pln(400));

        let pricing = line_pricing(&lines).unwrap();
        assert_eq!(pricing[0].total, Money::pln(1600));
        assert_eq!(pricing[0].savings, Money::pln(400));
        assert_eq!(pricing[1].savings, Money::pln(0));
    }
}
