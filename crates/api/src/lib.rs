//! # Stockline API
//!
//! HTTP surface of the marketplace integration engine.
//!
//! Exposes the OAuth connect/callback flow, product synchronization, remote
//! catalog listing, connection statistics, forced token refresh, and
//! disconnect. Request routing is intentionally thin: handlers delegate to
//! the core services and shape the JSON envelope.

pub mod context;
pub mod response;
pub mod routes;

pub use context::AppContext;
