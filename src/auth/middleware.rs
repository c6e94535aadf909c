use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{decode_token_of, TokenUse},
    error::AppError,
    rbac::Principal,
    repositories::UserRepository,
    AppState,
};

/// The token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. A blank token counts as absent.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolves the caller from the access token and attaches them to the request.
///
/// The user is re-read on every request: a deleted account is rejected with
/// 401 and the stored role wins over the one in the token. Requests without a
/// usable token stop here with 401. Refresh tokens are not accepted.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "Request without bearer token");
        return Err(AppError::Unauthorized);
    };

    let claims = decode_token_of(token, &state.config.jwt_secret, TokenUse::Access)?;
    let Some(user) = UserRepository::find_by_id(&state.pool, claims.sub).await? else {
        tracing::debug!(user_id = %claims.sub, "Token for a user that no longer exists");
        return Err(AppError::Unauthorized);
    };

    if user.role.as_str() != claims.role {
        tracing::debug!(
            user_id = %user.id,
            token_role = %claims.role,
            stored_role = %user.role,
            "Role changed since token was issued"
        );
    }

    request.extensions_mut().insert(Principal::from(user));

    Ok(next.run(request).await)
}

/// The authenticated caller, as resolved by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(principal) => Ok(AuthUser(principal.clone())),
            None => Err(AppError::Unauthorized),
        }
    }
}
