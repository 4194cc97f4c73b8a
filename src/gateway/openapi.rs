//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:5000/docs`
//! - OpenAPI JSON: `http://localhost:5000/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::ErrorResponse;
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{
    MessageResponse, MusicPageResponse, MusicQueryResponse, SubscribeRequest, SubscribeResponse,
    SubscriptionsResponse,
};
use crate::models::{CatalogKey, Song, UserProfile};
use crate::user_auth::{AuthResponse, LoginRequest, RegisterRequest};

/// Bearer JWT issued by `/login`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by POST /login"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Music Catalog API",
        version = "0.1.0",
        description = "User accounts, song catalog browsing and album subscriptions.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::user_auth::handlers::register,
        crate::user_auth::handlers::login,
        crate::user_auth::handlers::current_user,
        crate::gateway::handlers::music::get_music,
        crate::gateway::handlers::music::query_music,
        crate::gateway::handlers::subscription::subscribe,
        crate::gateway::handlers::subscription::get_subscriptions,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            MessageResponse,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserProfile,
            Song,
            CatalogKey,
            MusicPageResponse,
            MusicQueryResponse,
            SubscribeRequest,
            SubscribeResponse,
            SubscriptionsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and current user"),
        (name = "Music", description = "Catalog browsing (no auth required)"),
        (name = "Subscriptions", description = "Album subscriptions (bearer token required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
