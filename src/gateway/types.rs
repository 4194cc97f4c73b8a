//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{CatalogKey, Song};

/// `{"message": "..."}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User registered successfully!")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Query parameters of `GET /music`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MusicPageParams {
    /// Page size (default 12)
    pub limit: Option<u32>,
    /// JSON text of the `lastEvaluatedKey` returned by the previous page
    pub last_evaluated_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MusicPageResponse {
    pub items: Vec<Song>,
    /// `null` on the last page
    #[serde(rename = "lastEvaluatedKey")]
    pub last_evaluated_key: Option<CatalogKey>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MusicQueryResponse {
    pub items: Vec<Song>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    #[schema(example = "Free Fallin'|||Full Moon Fever")]
    #[serde(default)]
    pub composite_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscribeResponse {
    pub subscribed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionsResponse {
    pub albums: Vec<Song>,
}
