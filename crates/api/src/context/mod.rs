//! Shared handler state and request extractors.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use stockline_core::{MarketplaceApi, SyncEngine, TokenLifecycleManager};

/// Dependencies shared by all handlers; constructed once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub lifecycle: Arc<TokenLifecycleManager>,
    pub sync: Arc<SyncEngine>,
    pub marketplace: Arc<dyn MarketplaceApi>,
}

/// Local user id supplied by the authenticated-identity collaborator.
///
/// Upstream authentication terminates before this engine; the resolved user
/// id reaches us via the `x-user-id` header. Requests without it are
/// rejected as unauthenticated.
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(|value| Self(value.to_string()))
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "success": false,
                        "message": "missing authenticated user",
                    })),
                )
                    .into_response()
            })
    }
}
