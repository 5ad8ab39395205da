//! HTTP route definitions.

pub mod mercadolibre;

use axum::Router;

use crate::context::AppContext;

/// Assemble the full application router.
pub fn router() -> Router<AppContext> {
    mercadolibre::router()
}
