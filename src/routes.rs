use axum::{
    http::{header, Method, Uri},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{auth::auth_middleware, config::Config, handlers, openapi::ApiDoc, AppState};

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let (auth_public, auth_protected) = handlers::auth_routes();

    // Public routes (no auth required)
    let public_routes = Router::new().nest("/auth", auth_public);

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .nest("/auth", auth_protected)
        .nest("/posts", handlers::post_routes())
        .nest("/users", handlers::user_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine all routes under /api
    Router::new()
        .route("/", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", public_routes.merge(protected_routes))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(config.allowed_origins())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "message": "Postgate API is running",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "path": uri.path(),
        })),
    )
}
