//! ZENBUY storefront library.
//!
//! Client-side state and flows for the ZENBUY shop: catalog browsing and
//! filtering, a cart persisted in a durable slot, checkout and payment entry,
//! order history, and the admin console. Everything that talks to the shop's
//! REST backend goes through [`backend::BackendClient`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod admin;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod orders;
pub mod session;
pub mod storage;
