use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    handlers::ApiJson,
    auth::AuthUser,
    error::{AppError, AppResult, ErrorResponse},
    models::{parse_post_id, CreatePost, PaginationMeta, PaginationParams, PostView, UpdatePost},
    rbac::{actions, authorize_owned, require_any},
    repositories::PostRepository,
    AppState,
};

const READ: &[&str] = &[actions::POSTS_READ];
const CREATE: &[&str] = &[actions::POSTS_CREATE];

/// Paginated list of posts, newest first
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostListResponse {
    pub data: Vec<PostView>,
    pub pagination: PaginationMeta,
}

/// Updated post
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub post: PostView,
}

/// Deletion confirmation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "Post deleted successfully")]
    pub message: String,
    pub deleted_id: String,
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    operation_id = "listPosts",
    summary = "List posts",
    description = "Returns posts newest first, each with its author's id and username. \
                   Requires the 'posts:read' permission.",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Posts retrieved", body = PostListResponse),
        (status = 401, description = "Missing or invalid authentication token", body = ErrorResponse),
        (status = 403, description = "Role lacks 'posts:read'", body = ErrorResponse)
    )
)]
async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PostListResponse>> {
    let posts = PostRepository::find_all(&state.pool, params.limit(), params.offset()).await?;
    let total = PostRepository::count(&state.pool).await?;

    Ok(Json(PostListResponse {
        data: posts,
        pagination: params.meta(total),
    }))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    operation_id = "createPost",
    summary = "Create a post",
    description = "Creates a post authored by the caller. Title and content are required and stored trimmed. \
                   Requires the 'posts:create' permission.",
    security(("bearer_auth" = [])),
    request_body(content = CreatePost),
    responses(
        (status = 201, description = "Post created", body = PostView),
        (status = 400, description = "Title or content missing", body = ErrorResponse),
        (status = 401, description = "Missing or invalid authentication token", body = ErrorResponse),
        (status = 403, description = "Role lacks 'posts:create'", body = ErrorResponse)
    )
)]
async fn create_post(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(input): ApiJson<CreatePost>,
) -> AppResult<(StatusCode, Json<PostView>)> {
    let (title, content) = input.normalized().ok_or_else(|| {
        AppError::Validation("Please provide both title and content".to_string())
    })?;

    let post = PostRepository::create(&state.pool, principal.id, title, content).await?;
    let view = PostRepository::find_view(&state.pool, post.id).await?;

    tracing::info!(post_id = %post.id, author_id = %principal.id, "Post created");
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    operation_id = "updatePost",
    summary = "Update a post",
    description = "Updates title and/or content. Admins may update any post; editors only their own. \
                   Ownership is read from the stored post, never from the request.",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Post identifier (UUID)")
    ),
    request_body(content = UpdatePost),
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Invalid post id, or nothing to update", body = ErrorResponse),
        (status = 401, description = "Missing or invalid authentication token", body = ErrorResponse),
        (status = 403, description = "Not allowed to update this post", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
async fn update_post(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdatePost>,
) -> AppResult<Json<PostResponse>> {
    let id = parse_post_id(&id)?;

    let (title, content) = input.normalized();
    if title.is_none() && content.is_none() {
        return Err(AppError::Validation(
            "Please provide title or content to update".to_string(),
        ));
    }

    let stored = PostRepository::find_by_id(&state.pool, id).await?;
    authorize_owned(
        &principal,
        actions::POSTS_UPDATE,
        stored.author_id,
        "Forbidden: You can only update your own posts",
    )?;

    PostRepository::update(&state.pool, id, title, content).await?;
    let post = PostRepository::find_view(&state.pool, id).await?;

    tracing::info!(post_id = %id, user_id = %principal.id, "Post updated");
    Ok(Json(PostResponse { post }))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    operation_id = "deletePost",
    summary = "Delete a post",
    description = "Deletes a post. Admins may delete any post; editors only their own.",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Post identifier (UUID)")
    ),
    responses(
        (status = 200, description = "Post deleted", body = DeleteResponse),
        (status = 400, description = "Invalid post id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid authentication token", body = ErrorResponse),
        (status = 403, description = "Not allowed to delete this post", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
async fn delete_post(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(raw_id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let id = parse_post_id(&raw_id)?;

    let stored = PostRepository::find_by_id(&state.pool, id).await?;
    authorize_owned(
        &principal,
        actions::POSTS_DELETE,
        stored.author_id,
        "Forbidden: You can only delete your own posts",
    )?;

    PostRepository::delete(&state.pool, id).await?;

    tracing::info!(post_id = %id, user_id = %principal.id, "Post deleted");
    Ok(Json(DeleteResponse {
        message: "Post deleted successfully".to_string(),
        deleted_id: id.to_string(),
    }))
}

/// Create post routes (all protected)
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_posts)
                .route_layer(middleware::from_fn(|req: Request, next: Next| {
                    require_any(READ, req, next)
                }))
                .merge(post(create_post).route_layer(middleware::from_fn(
                    |req: Request, next: Next| require_any(CREATE, req, next),
                ))),
        )
        .route("/:id", put(update_post).delete(delete_post))
}
