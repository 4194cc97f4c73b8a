pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::user_auth::middleware::jwt_auth_middleware;
pub use state::AppState;

/// Assemble the full HTTP router.
///
/// Catalog browsing, registration and login are public; everything that
/// acts on behalf of a user sits behind the JWT middleware.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    let state = Arc::new(state);

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/register", post(crate::user_auth::handlers::register))
        .route("/login", post(crate::user_auth::handlers::login))
        .route("/music", get(handlers::get_music))
        .route("/music/query", get(handlers::query_music));

    let user_routes = Router::new()
        .route("/user", get(crate::user_auth::handlers::current_user))
        .route("/subscribe", post(handlers::subscribe))
        .route("/subscriptions", get(handlers::get_subscriptions))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let app = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http());

    if config.cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Bind the configured address and serve until the process is stopped.
pub async fn run_server(config: &GatewayConfig, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state, config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            config.port
        )
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
