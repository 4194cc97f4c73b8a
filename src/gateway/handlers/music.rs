//! Catalog handlers (listing, query)

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use super::super::state::AppState;
use super::super::types::{MusicPageParams, MusicPageResponse, MusicQueryResponse};
use crate::catalog::SongFilter;
use crate::error::{ApiError, ErrorResponse};

/// Paginated catalog listing
///
/// GET /music?limit=12&last_evaluated_key={"title":..,"album":..}
#[utoipa::path(
    get,
    path = "/music",
    params(MusicPageParams),
    responses(
        (status = 200, description = "One page of songs", body = MusicPageResponse),
        (status = 400, description = "Invalid limit or continuation key", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "Music"
)]
pub async fn get_music(
    State(state): State<Arc<AppState>>,
    params: Result<Query<MusicPageParams>, QueryRejection>,
) -> Result<Json<MusicPageResponse>, ApiError> {
    let Query(params) = params?;
    let page = state
        .catalog
        .list(params.limit, params.last_evaluated_key.as_deref())
        .await?;

    Ok(Json(MusicPageResponse {
        items: page.items,
        last_evaluated_key: page.last_evaluated_key,
    }))
}

/// Query the catalog by title, artist, year and/or album
///
/// GET /music/query?title=American&artist=Tom%20Petty
#[utoipa::path(
    get,
    path = "/music/query",
    params(SongFilter),
    responses(
        (status = 200, description = "Matching songs", body = MusicQueryResponse),
        (status = 400, description = "No query parameter supplied", body = ErrorResponse),
        (status = 404, description = "No matching song", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "Music"
)]
pub async fn query_music(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<SongFilter>, QueryRejection>,
) -> Result<Json<MusicQueryResponse>, ApiError> {
    let Query(filter) = filter?;
    let items = state.catalog.query(filter).await?;
    Ok(Json(MusicQueryResponse { items }))
}
