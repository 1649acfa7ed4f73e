//! Cart domain types.

use serde::{Deserialize, Serialize};

use super::ProductId;

/// One product held in a user's cart.
///
/// A cart holds at most one line per product and `quantity` is always
/// positive; the database enforces both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product held.
    pub product_id: ProductId,
    /// Units held.
    pub quantity: u32,
}

impl CartLine {
    /// Create a cart line.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Find the line holding `product_id`, if the cart has one.
#[must_use]
pub fn cart_line_for(lines: &[CartLine], product_id: ProductId) -> Option<&CartLine> {
    lines.iter().find(|line| line.product_id == product_id)
}

/// Total units across every line of a cart. Zero for an empty cart.
#[must_use]
pub fn cart_unit_count(lines: &[CartLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_count_sums_every_line() {
        let lines = [
            CartLine::new(ProductId::new(1), 2),
            CartLine::new(ProductId::new(2), 3),
        ];
        assert_eq!(cart_unit_count(&lines), 5);
        assert_eq!(cart_unit_count(&[]), 0);
    }

    #[test]
    fn test_unit_count_does_not_overflow_u32() {
        let lines = [
            CartLine::new(ProductId::new(1), u32::MAX),
            CartLine::new(ProductId::new(2), u32::MAX),
        ];
        assert_eq!(cart_unit_count(&lines), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_line_lookup() {
        let lines = [
            CartLine::new(ProductId::new(1), 2),
            CartLine::new(ProductId::new(2), 3),
        ];
        assert_eq!(
            cart_line_for(&lines, ProductId::new(2)).map(|l| l.quantity),
            Some(3)
        );
        assert!(cart_line_for(&lines, ProductId::new(9)).is_none());
    }
}
