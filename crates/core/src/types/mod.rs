//! Core types for Emporium.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod catalog;
pub mod email;
pub mod id;
pub mod price;
pub mod role;

pub use cart::{CartLine, cart_line_for, cart_unit_count};
pub use catalog::{Category, Product, ProductImage};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use role::{Role, RoleParseError};
