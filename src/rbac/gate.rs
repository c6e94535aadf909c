use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use super::evaluator::Principal;
use crate::error::{AppError, AppResult};

pub const FORBIDDEN_MESSAGE: &str = "Forbidden: You do not have permission to perform this action";

/// Route-level gate. Runs after the identity middleware and lets the request
/// through when the principal holds at least one of `actions`.
///
/// ```ignore
/// get(list_posts).route_layer(middleware::from_fn(|req: Request, next: Next| {
///     require_any(&[actions::POSTS_READ], req, next)
/// }))
/// ```
pub async fn require_any(
    actions: &'static [&'static str],
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or(AppError::Unauthorized)?;

    check_any(principal, actions)?;

    Ok(next.run(request).await)
}

fn check_any(principal: &Principal, actions: &[&str]) -> AppResult<()> {
    if actions
        .iter()
        .any(|action| principal.can(action, None).is_allowed())
    {
        return Ok(());
    }

    tracing::debug!(
        user_id = %principal.id,
        role = %principal.role,
        ?actions,
        "route access denied"
    );
    Err(AppError::Forbidden(FORBIDDEN_MESSAGE))
}

/// Per-resource check against the stored owner of the resource.
pub fn authorize_owned(
    principal: &Principal,
    action: &str,
    owner_id: Uuid,
    denied: &'static str,
) -> AppResult<()> {
    if principal.can(action, Some(owner_id)).is_allowed() {
        return Ok(());
    }

    tracing::debug!(
        user_id = %principal.id,
        role = %principal.role,
        %owner_id,
        action,
        "resource access denied"
    );
    Err(AppError::Forbidden(denied))
}
