use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    routing::get,
    Json, Router,
};

use crate::{
    error::{AppResult, ErrorResponse},
    models::UserSummary,
    rbac::{actions, require_any},
    repositories::UserRepository,
    AppState,
};

const MANAGE: &[&str] = &[actions::USERS_MANAGE];

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    operation_id = "listUsers",
    summary = "List all users",
    description = "Returns every user account, newest first. Requires the 'users:manage' permission.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users retrieved successfully", body = [UserSummary]),
        (status = 401, description = "Missing or invalid authentication token", body = ErrorResponse),
        (status = 403, description = "Role lacks 'users:manage'", body = ErrorResponse)
    )
)]
async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserSummary>>> {
    let users = UserRepository::find_all(&state.pool).await?;
    Ok(Json(users))
}

/// Create user routes (all protected)
pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(list_users).route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_any(MANAGE, req, next)
        })),
    )
}
