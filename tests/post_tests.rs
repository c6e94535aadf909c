use axum::http::StatusCode;
use postgate::{
    rbac::{Role, FORBIDDEN_MESSAGE},
    repositories::PostRepository,
    routes::create_router,
};
use serde_json::json;
use uuid::Uuid;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{create_test_state, lazy_app, make_request, seed_user, setup_test_db};

#[tokio::test]
async fn test_list_posts_requires_auth() {
    let (status, body) = make_request(lazy_app(), "GET", "/api/posts", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authorized");
}

#[tokio::test]
async fn test_mutations_require_auth() {
    let path = format!("/api/posts/{}", Uuid::new_v4());

    for (method, path, body) in [
        ("POST", "/api/posts", Some(json!({"title": "t", "content": "c"}))),
        ("PUT", path.as_str(), Some(json!({"title": "t"}))),
        ("DELETE", path.as_str(), None),
    ] {
        let (status, _) = make_request(lazy_app(), method, path, body, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {path}");
    }
}

// Requires a running database

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_viewer_cannot_create_post() {
    let pool = setup_test_db().await;
    let (_, token) = seed_user(&pool, Role::Viewer).await;

    let (status, body) = make_request(
        create_router(create_test_state(pool)),
        "POST",
        "/api/posts",
        Some(json!({"title": "Hello", "content": "World"})),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], FORBIDDEN_MESSAGE);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_post_requires_title_and_content() {
    let pool = setup_test_db().await;
    let state = create_test_state(pool.clone());
    let (_, token) = seed_user(&pool, Role::Editor).await;

    for body in [
        json!({"title": "   ", "content": "World"}),
        json!({"title": "Hello", "content": ""}),
        json!({"title": "Hello"}),
        json!({}),
    ] {
        let (status, resp) = make_request(
            create_router(state.clone()),
            "POST",
            "/api/posts",
            Some(body),
            Some(&token),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"], "Please provide both title and content");
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_invalid_post_id_rejected_before_lookup() {
    let pool = setup_test_db().await;
    let state = create_test_state(pool.clone());

    for role in Role::ALL {
        let (_, token) = seed_user(&pool, role).await;

        let (status, body) = make_request(
            create_router(state.clone()),
            "PUT",
            "/api/posts/not-a-uuid",
            Some(json!({"title": "New"})),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid post ID format");

        let (status, body) = make_request(
            create_router(state.clone()),
            "DELETE",
            "/api/posts/not-a-uuid",
            None,
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid post ID format");
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_requires_a_field() {
    let pool = setup_test_db().await;
    let (_, token) = seed_user(&pool, Role::Admin).await;

    let (status, body) = make_request(
        create_router(create_test_state(pool)),
        "PUT",
        &format!("/api/posts/{}", Uuid::new_v4()),
        Some(json!({"title": "  "})),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please provide title or content to update");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_with_empty_body_is_json_error() {
    let pool = setup_test_db().await;
    let (_, token) = seed_user(&pool, Role::Admin).await;

    let (status, body) = make_request(
        create_router(create_test_state(pool)),
        "PUT",
        &format!("/api/posts/{}", Uuid::new_v4()),
        None,
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_editor_owns_their_posts() {
    let pool = setup_test_db().await;
    let state = create_test_state(pool.clone());
    let (editor, editor_token) = seed_user(&pool, Role::Editor).await;
    let (_, other_token) = seed_user(&pool, Role::Editor).await;

    let (status, created) = make_request(
        create_router(state.clone()),
        "POST",
        "/api/posts",
        Some(json!({"title": "  Mine  ", "content": "Body"})),
        Some(&editor_token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Mine");
    assert_eq!(created["author"]["id"], editor.to_string());
    let post_id = created["id"].as_str().unwrap().to_string();

    let (status, body) = make_request(
        create_router(state.clone()),
        "PUT",
        &format!("/api/posts/{post_id}"),
        Some(json!({"title": "Stolen"})),
        Some(&other_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden: You can only update your own posts");

    let (status, body) = make_request(
        create_router(state.clone()),
        "PUT",
        &format!("/api/posts/{post_id}"),
        Some(json!({"content": "Edited"})),
        Some(&editor_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["title"], "Mine");
    assert_eq!(body["post"]["content"], "Edited");

    let (status, body) = make_request(
        create_router(state.clone()),
        "DELETE",
        &format!("/api/posts/{post_id}"),
        None,
        Some(&other_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden: You can only delete your own posts");

    let (status, body) = make_request(
        create_router(state),
        "DELETE",
        &format!("/api/posts/{post_id}"),
        None,
        Some(&editor_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Post deleted successfully");
    assert_eq!(body["deleted_id"], post_id.as_str());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_admin_may_change_any_post() {
    let pool = setup_test_db().await;
    let state = create_test_state(pool.clone());
    let (editor, _) = seed_user(&pool, Role::Editor).await;
    let (_, admin_token) = seed_user(&pool, Role::Admin).await;
    let post = PostRepository::create(&pool, editor, "Editor post", "Body")
        .await
        .unwrap();

    let (status, body) = make_request(
        create_router(state.clone()),
        "PUT",
        &format!("/api/posts/{}", post.id),
        Some(json!({"title": "Moderated"})),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["author"]["id"], editor.to_string());

    let (status, _) = make_request(
        create_router(state),
        "DELETE",
        &format!("/api/posts/{}", post.id),
        None,
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_missing_post_is_404_before_permission() {
    let pool = setup_test_db().await;
    let (_, viewer_token) = seed_user(&pool, Role::Viewer).await;

    let (status, body) = make_request(
        create_router(create_test_state(pool)),
        "DELETE",
        &format!("/api/posts/{}", Uuid::new_v4()),
        None,
        Some(&viewer_token),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Post not found");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_viewer_lists_posts_newest_first() {
    let pool = setup_test_db().await;
    let state = create_test_state(pool.clone());
    let (editor, _) = seed_user(&pool, Role::Editor).await;
    let (_, token) = seed_user(&pool, Role::Viewer).await;
    PostRepository::create(&pool, editor, "Older", "Body").await.unwrap();
    PostRepository::create(&pool, editor, "Newer", "Body").await.unwrap();

    let (status, body) = make_request(
        create_router(state),
        "GET",
        "/api/posts?page=1&per_page=100",
        None,
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let posts = body["data"].as_array().unwrap();
    let newer = posts.iter().position(|p| p["title"] == "Newer").unwrap();
    let older = posts.iter().position(|p| p["title"] == "Older").unwrap();
    assert!(newer < older);
    assert!(posts.iter().all(|p| p["author"]["username"].is_string()));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_huge_page_number_returns_empty_page() {
    let pool = setup_test_db().await;
    let (_, token) = seed_user(&pool, Role::Viewer).await;

    let (status, body) = make_request(
        create_router(create_test_state(pool)),
        "GET",
        "/api/posts?page=9223372036854775807",
        None,
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["page"], i64::MAX);
}
