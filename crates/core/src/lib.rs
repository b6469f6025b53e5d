//! ZENBUY Core - Shared types library.
//!
//! This crate provides common types used across all ZENBUY components:
//! - `storefront` - Catalog filtering, cart state, checkout and the backend client
//! - `cli` - Command-line front end for the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for opaque IDs, prices, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
