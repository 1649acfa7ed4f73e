//! Emporium Core - Shared domain types.
//!
//! This crate provides the types used across all Emporium components:
//! - `storefront` - Public-facing shop and admin area
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP clients. Stock availability is decided here so that every
//! caller gets the same answer for the same inputs.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices, roles, catalog and cart types
//! - [`availability`] - Stock state evaluation for the product page

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod availability;
pub mod types;

pub use availability::{AvailabilityStatus, StockState, evaluate};
pub use types::*;
