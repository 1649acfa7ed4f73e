//! Stock availability for the product page.
//!
//! [`evaluate`] combines a product's on-hand quantity, the shopper's cart
//! and wishlist membership into an [`AvailabilityStatus`]. It is a pure
//! function: callers resolve the product and cart before invoking it.
//!
//! Stock and cart are read without a shared transaction, so a cart may hold
//! more units than remain on hand after a concurrent sale. That case is
//! reported as [`StockState::OutOfStock`].

use serde::{Deserialize, Serialize};

use crate::types::{CartLine, Product, cart_unit_count};

/// Stock state of a product as seen by one shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockState {
    /// Nothing on hand, or the cart already holds more than is on hand.
    OutOfStock,
    /// The cart holds exactly the units on hand; no more can be added.
    CartEqualsStock,
    /// More units can be added to the cart.
    InStock,
}

impl StockState {
    /// Banner text shown on the product page.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OutOfStock => "OUT OF STOCK",
            Self::CartEqualsStock => "QUANTITY IN CART ALREADY EQUALS STOCK IN INVENTORY",
            Self::InStock => "IN STOCK",
        }
    }
}

/// Availability of one product for one shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityStatus {
    /// Stock state of the product.
    pub state: StockState,
    /// Whether the product is on the shopper's wishlist.
    pub wishlisted: bool,
    /// Units across the shopper's whole cart, not just this product.
    pub cart_unit_count: u64,
}

/// Evaluate the availability of `product` for a shopper.
///
/// * `cart_line` - the shopper's line for this product, if any
/// * `cart_lines` - every line of the shopper's cart, for the unit count
/// * `wishlisted` - wishlist membership, passed through unchanged
///
/// Branches are checked in order:
///
/// 1. nothing on hand → `OutOfStock`
/// 2. cart holds exactly the on-hand quantity → `CartEqualsStock`
/// 3. cart holds more than the on-hand quantity → `OutOfStock`
/// 4. otherwise → `InStock`
///
/// ```
/// use emporium_core::{CartLine, StockState, evaluate};
/// # use emporium_core::{CategoryId, CurrencyCode, Price, Product, ProductId};
/// # let product = Product {
/// #     id: ProductId::new(1),
/// #     category_id: CategoryId::new(1),
/// #     name: "Soap".into(),
/// #     description: String::new(),
/// #     price: Price::from_cents(250, CurrencyCode::USD).unwrap(),
/// #     quantity: 5,
/// #     image_key: "soap.png".into(),
/// #     images: Vec::new(),
/// # };
/// let line = CartLine::new(product.id, 5);
/// let status = evaluate(&product, Some(&line), &[line], false);
/// assert_eq!(status.state, StockState::CartEqualsStock);
/// assert_eq!(status.cart_unit_count, 5);
/// ```
#[must_use]
pub fn evaluate(
    product: &Product,
    cart_line: Option<&CartLine>,
    cart_lines: &[CartLine],
    wishlisted: bool,
) -> AvailabilityStatus {
    let state = if product.quantity == 0 {
        StockState::OutOfStock
    } else {
        match cart_line {
            Some(line) if line.quantity == product.quantity => StockState::CartEqualsStock,
            Some(line) if product.quantity < line.quantity => StockState::OutOfStock,
            _ => StockState::InStock,
        }
    };

    AvailabilityStatus {
        state,
        wishlisted,
        cart_unit_count: cart_unit_count(cart_lines),
    }
}
