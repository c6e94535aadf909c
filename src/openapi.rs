use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    error::ErrorResponse,
    handlers::{
        auth_handlers::{__path_login, __path_me, __path_permissions, __path_refresh},
        post_handlers::{
            __path_create_post, __path_delete_post, __path_list_posts, __path_update_post,
            DeleteResponse, PostListResponse, PostResponse,
        },
        user_handlers::__path_list_users,
    },
    models::{Author, CreatePost, PaginationMeta, PostView, UpdatePost, UserSummary},
    rbac::{Principal, Role, Scope},
    services::{AuthResponse, LoginRequest, RefreshRequest},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Postgate API",
        description = "Posts API with role-based access control. \
                       Roles are Admin, Editor and Viewer. Every protected endpoint requires a JWT access token \
                       in the Authorization header (Bearer scheme). Editors may change only posts they authored; \
                       admins may change any post; viewers may only read.",
        version = "0.1.0",
    ),
    tags(
        (name = "auth", description = "Login, token refresh, the current user, and the permission matrix clients use to gate their UI."),
        (name = "posts", description = "Post CRUD. Reading requires 'posts:read', creating 'posts:create'. \
                                         Update and delete check the stored author against the caller's role."),
        (name = "users", description = "User administration. Requires 'users:manage'.")
    ),
    paths(
        // Auth
        login,
        refresh,
        me,
        permissions,
        // Posts
        list_posts,
        create_post,
        update_post,
        delete_post,
        // Users
        list_users,
    ),
    components(
        schemas(
            // Auth
            LoginRequest,
            RefreshRequest,
            AuthResponse,
            Principal,
            Role,
            Scope,
            // Posts
            Author,
            PostView,
            CreatePost,
            UpdatePost,
            PostListResponse,
            PostResponse,
            DeleteResponse,
            // Users
            UserSummary,
            // Pagination
            PaginationMeta,
            // Errors
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

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
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/auth/login",
            "/api/auth/refresh",
            "/api/auth/me",
            "/api/auth/permissions",
            "/api/posts",
            "/api/posts/{id}",
            "/api/users",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
