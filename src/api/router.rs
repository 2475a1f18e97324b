//! API router.
//!
//! Three route groups under `/api`: public (health), authenticated (the
//! pipeline, reports, feedback, chat), and admin (curation), each with its
//! middleware stack. Handlers get `ApiContext` via `State`; middleware gets
//! it via the outermost `Extension` layer.

use axum::routing::{get, post, put};
use axum::{Extension, Router};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router with all routes mounted under `/api`.
pub fn api_router(ctx: ApiContext) -> Router {
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx.clone());

    let authenticated = Router::new()
        .route("/predict", post(endpoints::predict::predict))
        .route("/predict/batch", post(endpoints::predict::predict_batch))
        .route("/treatments/:disease", get(endpoints::treatments::by_disease))
        .route("/reports", get(endpoints::reports::list))
        .route(
            "/reports/:id",
            get(endpoints::reports::detail).delete(endpoints::reports::remove),
        )
        .route("/feedback", post(endpoints::feedback::submit))
        .route("/chat", post(endpoints::chat::ask))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth));

    let admin = Router::new()
        .route("/admin/reports", get(endpoints::admin::list_reports))
        .route(
            "/admin/treatments",
            get(endpoints::admin::list_catalog).post(endpoints::admin::upsert),
        )
        .route(
            "/admin/treatments/:id",
            put(endpoints::admin::update).delete(endpoints::admin::remove),
        )
        .with_state(ctx.clone())
        // Innermost first: admin check runs after auth has injected the user.
        .layer(axum::middleware::from_fn(middleware::admin::require_admin))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth));

    Router::new()
        .nest("/api", public)
        .nest("/api", authenticated)
        .nest("/api", admin)
        // Extension must be outermost so middleware can extract ApiContext.
        .layer(Extension(ctx))
}
