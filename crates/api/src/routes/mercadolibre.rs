//! MercadoLibre integration endpoints.

use axum::extract::{Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use stockline_domain::{RemoteItem, SyncAction, SyncResult};
use tracing::info;

use crate::context::{AppContext, CurrentUser};
use crate::response::{ApiError, ApiResponse};

/// Routes under `/mercadolibre`.
pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/mercadolibre/auth", get(start_auth))
        .route("/mercadolibre/callback", get(auth_callback))
        .route("/mercadolibre/products", get(remote_products))
        .route("/mercadolibre/sync", post(sync_products))
        .route("/mercadolibre/stats", get(stats))
        .route("/mercadolibre/refresh-token", post(force_refresh))
        .route("/mercadolibre/disconnect", delete(disconnect))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthUrlData {
    auth_url: String,
    state: String,
}

async fn start_auth(
    State(ctx): State<AppContext>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<AuthUrlData>>, ApiError> {
    let (auth_url, state) = ctx.lifecycle.authorization_url(&user_id)?;

    Ok(ApiResponse::ok(
        AuthUrlData { auth_url, state },
        "Authorization URL generated. Redirect the user to complete the marketplace connection.",
    ))
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: String,
    #[serde(default)]
    state: String,
}

async fn auth_callback(
    State(ctx): State<AppContext>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let (token, user_info) = ctx.lifecycle.complete_authorization(&query.code, &query.state).await?;

    let data = json!({
        "mlUser": {
            "id": user_info.id,
            "nickname": user_info.nickname,
            "email": user_info.email,
            "country": user_info.country_id,
            "userType": user_info.user_type,
        },
        "tokenExpiresAt": token.expires_at,
        "scopes": token.scopes,
    });

    Ok(ApiResponse::ok(
        data,
        format!("Marketplace connection established as {}", user_info.nickname),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoteProductSummary {
    id: String,
    title: String,
    price: f64,
    available_quantity: i64,
    condition: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    permalink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<String>,
}

impl From<RemoteItem> for RemoteProductSummary {
    fn from(item: RemoteItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            price: item.price,
            available_quantity: item.available_quantity,
            condition: item.condition,
            status: item.status,
            permalink: item.permalink,
            thumbnail: item.thumbnail,
            category_id: item.category_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoteProductsData {
    products: Vec<RemoteProductSummary>,
    total_products: usize,
    total_value: f64,
}

async fn remote_products(
    State(ctx): State<AppContext>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<RemoteProductsData>>, ApiError> {
    let token = ctx.lifecycle.active_token(&user_id).await?;
    let ids = ctx
        .marketplace
        .list_active_item_ids(&token.access_token, &token.remote_user_id)
        .await?;
    let items = ctx.marketplace.fetch_items_batch(&token.access_token, &ids).await?;

    let total_value: f64 = items.iter().map(|item| item.price * item.available_quantity as f64).sum();
    let message = format!("{} products found on the marketplace", items.len());
    let data = RemoteProductsData {
        total_products: items.len(),
        total_value,
        products: items.into_iter().map(RemoteProductSummary::from).collect(),
    };

    Ok(ApiResponse::ok(data, message))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncRequest {
    #[serde(default)]
    product_ids: Option<Vec<String>>,
    #[serde(default)]
    force_sync: bool,
}

/// Aggregate counts derived from the per-product results.
#[derive(Debug, Serialize)]
struct SyncSummary {
    total: usize,
    successful: usize,
    errors: usize,
    created: usize,
    updated: usize,
}

impl SyncSummary {
    fn from_results(results: &[SyncResult]) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            successful,
            errors: results.len() - successful,
            created: results.iter().filter(|r| r.action == SyncAction::Created).count(),
            updated: results.iter().filter(|r| r.action == SyncAction::Updated).count(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SyncResponseData {
    results: Vec<SyncResult>,
    summary: SyncSummary,
}

async fn sync_products(
    State(ctx): State<AppContext>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<SyncRequest>,
) -> Result<Json<ApiResponse<SyncResponseData>>, ApiError> {
    let results =
        ctx.sync.sync_products(&user_id, request.product_ids, request.force_sync).await?;

    let summary = SyncSummary::from_results(&results);
    let message = format!(
        "Synchronization finished: {}/{} products synchronized",
        summary.successful, summary.total
    );

    info!(user_id, total = summary.total, successful = summary.successful, "sync completed");

    Ok(ApiResponse::ok(SyncResponseData { results, summary }, message))
}

async fn stats(
    State(ctx): State<AppContext>,
    CurrentUser(user_id): CurrentUser,
) -> Json<ApiResponse<serde_json::Value>> {
    match collect_stats(&ctx, &user_id).await {
        Ok(data) => ApiResponse::ok(data, "Marketplace statistics retrieved"),
        Err(err) => ApiResponse::ok(
            json!({ "connected": false, "error": err.0.to_string() }),
            "No active marketplace connection",
        ),
    }
}

async fn collect_stats(ctx: &AppContext, user_id: &str) -> Result<serde_json::Value, ApiError> {
    let token = ctx.lifecycle.active_token(user_id).await?;
    let ids = ctx
        .marketplace
        .list_active_item_ids(&token.access_token, &token.remote_user_id)
        .await?;
    let items = ctx.marketplace.fetch_items_batch(&token.access_token, &ids).await?;

    let active = items.iter().filter(|item| item.status == "active").count();
    let paused = items.iter().filter(|item| item.status == "paused").count();

    Ok(json!({
        "connected": true,
        "remoteUserId": token.remote_user_id,
        "tokenExpiresAt": token.expires_at,
        "totalProducts": items.len(),
        "activeProducts": active,
        "pausedProducts": paused,
        "lastSync": token.last_refresh_at,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshedTokenData {
    expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_refresh_at: Option<DateTime<Utc>>,
}

async fn force_refresh(
    State(ctx): State<AppContext>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<RefreshedTokenData>>, ApiError> {
    let token = ctx.lifecycle.active_token(&user_id).await?;
    let refreshed = ctx.lifecycle.refresh(&token.id).await?;

    Ok(ApiResponse::ok(
        RefreshedTokenData {
            expires_at: refreshed.expires_at,
            last_refresh_at: refreshed.last_refresh_at,
        },
        "Marketplace token renewed",
    ))
}

async fn disconnect(
    State(ctx): State<AppContext>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    ctx.lifecycle.disconnect(&user_id).await?;

    Ok(Json(ApiResponse {
        success: true,
        message: "Marketplace connection disconnected. You can reconnect at any time.".to_string(),
        data: None,
    }))
}
