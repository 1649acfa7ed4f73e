//! Business logic services for the storefront.
//!
//! - `auth` - Password sign-in
//! - `shop` - Page models for the shop, cart and wishlist
//! - `storage` - Product image upload, deletion and presigned URLs

pub mod auth;
pub mod shop;
pub mod storage;
