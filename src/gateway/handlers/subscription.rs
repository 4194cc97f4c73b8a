//! Subscription handlers (JWT required)

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};

use super::super::state::AppState;
use super::super::types::{SubscribeRequest, SubscribeResponse, SubscriptionsResponse};
use crate::error::{ApiError, ErrorResponse};
use crate::user_auth::Claims;

/// Toggle a subscription
///
/// POST /subscribe
#[utoipa::path(
    post,
    path = "/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Resulting membership", body = SubscribeResponse),
        (status = 400, description = "Missing composite_id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subscriptions"
)]
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let Json(req) = payload?;
    let subscribed = state
        .subscriptions
        .toggle(&claims.sub, &req.composite_id)
        .await?;
    Ok(Json(SubscribeResponse { subscribed }))
}

/// List subscribed albums
///
/// GET /subscriptions
#[utoipa::path(
    get,
    path = "/subscriptions",
    responses(
        (status = 200, description = "Subscribed albums", body = SubscriptionsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subscriptions"
)]
pub async fn get_subscriptions(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SubscriptionsResponse>, ApiError> {
    let albums = state.subscriptions.albums_for(&claims.sub).await?;
    Ok(Json(SubscriptionsResponse { albums }))
}
