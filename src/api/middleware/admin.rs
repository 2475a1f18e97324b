//! Admin authorization middleware.
//!
//! Runs after `require_auth`; the authenticated user must have a record in
//! the admins table or the request is rejected with FORBIDDEN.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthUser};
use crate::db::repository::admin::get_admin_by_user;

pub async fn require_admin(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_admin_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_admin_inner(
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;
    let user = *req
        .extensions()
        .get::<AuthUser>()
        .ok_or(ApiError::Unauthorized)?;

    let is_admin = tokio::task::spawn_blocking(move || -> Result<bool, ApiError> {
        let conn = ctx.open_db()?;
        Ok(get_admin_by_user(&conn, &user.user_id)?.is_some())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("blocking task: {e}")))??;

    if !is_admin {
        tracing::debug!(user_id = %user.user_id, "admin access denied");
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}
