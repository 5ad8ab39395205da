//! MercadoLibre REST API integration.
//!
//! Implements the `MarketplaceApi` port over the public MercadoLibre
//! endpoints: OAuth token grants, user info, item search, chunked item
//! multiget, and item create/update.

pub mod client;
mod types;

pub use client::MercadoLibreClient;
