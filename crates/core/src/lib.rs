//! Redcart Core - Shared domain types.
//!
//! This crate provides the common types used across the redcart components:
//! - `bot` - The worker pool, session, and checkout flow
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no runtime.
//! This keeps it lightweight and allows it to be used anywhere, including in
//! test doubles that never touch the network.
//!
//! # Modules
//!
//! - [`types`] - Buyer profiles, watched products, stock events, proxies, and
//!   newtype identifiers for carts and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
