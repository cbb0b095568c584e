//! Grouping cart lines into parcels by seller.

use crate::cart::CartLine;
use crate::error::CommerceError;
use crate::ids::SellerId;
use crate::money::Money;

/// Lines shipped by one seller.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerGroup<'a> {
    /// Seller id, or `None` for lines without seller data.
    pub seller_id: Option<&'a SellerId>,
    /// Lines in cart order.
    pub lines: Vec<&'a CartLine>,
}

impl SellerGroup<'_> {
    /// Sum of the group's line totals.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        let currency = self
            .lines
            .first()
            .map(|l| l.unit_price.currency)
            .unwrap_or_default();
        let totals = self
            .lines
            .iter()
            .map(|l| l.line_total())
            .collect::<Result<Vec<_>, _>>()?;
        Money::try_sum(totals.iter(), currency).ok_or(CommerceError::Overflow)
    }
}

/// Group lines by seller, ordering groups by first appearance.
pub fn group_by_seller(lines: &[CartLine]) -> Vec<SellerGroup<'_>> {
    let mut groups: Vec<SellerGroup<'_>> = Vec::new();
    for line in lines {
        let seller = line.seller_id.as_ref();
        match groups.iter_mut().find(|g| g.seller_id == seller) {
            Some(group) => group.lines.push(line),
            None => groups.push(SellerGroup {
                seller_id: seller,
                lines: vec![line],
            }),
        }
    }
    groups
}
