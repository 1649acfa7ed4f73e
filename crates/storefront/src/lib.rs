//! Emporium storefront library.
//!
//! Catalog browsing, cart and wishlist pages, product image storage and the
//! admin area, served as JSON page models over axum. The binary and the CLI
//! both build on this crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
