use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::{
    handlers::ApiJson,
    auth::AuthUser,
    error::{AppResult, ErrorResponse},
    rbac::{Principal, PolicyMatrix, PERMISSIONS},
    services::{AuthResponse, AuthService, LoginRequest, RefreshRequest},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    operation_id = "loginUser",
    summary = "Authenticate user",
    description = "Validates username and password and returns the user's identity and role \
                   together with an access token and a refresh token. Send the access token \
                   as 'Authorization: Bearer <token>' on subsequent requests.",
    request_body(
        description = "User login credentials",
        content = LoginRequest
    ),
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Username or password missing", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = AuthService::login(&state.pool, input, &state.config).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    operation_id = "refreshToken",
    summary = "Refresh access token",
    description = "Exchanges a refresh token for a new access/refresh token pair. \
                   The user's current role is re-read from storage.",
    request_body(
        description = "Refresh token issued at login or by a previous refresh",
        content = RefreshRequest
    ),
    responses(
        (status = 200, description = "New token pair issued", body = AuthResponse),
        (status = 401, description = "Refresh token invalid, expired, or user no longer exists", body = ErrorResponse)
    )
)]
async fn refresh(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = AuthService::refresh(&state.pool, &input.refresh_token, &state.config).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    operation_id = "getCurrentUser",
    summary = "Get current user",
    description = "Returns the id, username and role of the authenticated user, as currently stored.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = Principal),
        (status = 401, description = "Missing or invalid token, or the user no longer exists", body = ErrorResponse)
    )
)]
async fn me(AuthUser(principal): AuthUser) -> Json<Principal> {
    Json(principal)
}

#[utoipa::path(
    get,
    path = "/api/auth/permissions",
    tag = "auth",
    operation_id = "getPermissionMatrix",
    summary = "Get the permission matrix",
    description = "Returns the server's permission table keyed by role, then action, with scope \
                   'any' or 'own'. Clients use it to decide which controls to render; the server \
                   enforces the same table on every request.",
    responses(
        (status = 200, description = "Permission matrix, e.g. {\"Editor\": {\"posts:update\": \"own\"}}")
    )
)]
async fn permissions() -> Json<PolicyMatrix> {
    Json(PERMISSIONS.export())
}

/// Create auth routes - split into public and protected
pub fn auth_routes() -> (Router<AppState>, Router<AppState>) {
    let public = Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/permissions", get(permissions));

    let protected = Router::new().route("/me", get(me));

    (public, protected)
}
