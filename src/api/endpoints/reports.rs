//! Report history: list, detail, delete. All owner-scoped.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use super::run_blocking;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthUser, PageQuery, Pagination};
use crate::db::repository::report::{
    count_reports_for_user, delete_report, get_report_for_user, list_reports_for_user,
};
use crate::models::Report;

const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Serialize)]
pub struct ReportListResponse {
    pub data: Vec<Report>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

/// `GET /api/reports?page&limit` — own non-deleted reports, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ReportListResponse>, ApiError> {
    let pagination = Pagination::from_query(&query, DEFAULT_PAGE_SIZE);

    let response = run_blocking(move || {
        let conn = ctx.open_db()?;
        let data = list_reports_for_user(
            &conn,
            &user.user_id,
            pagination.offset(),
            pagination.limit,
        )?;
        let total = count_reports_for_user(&conn, &user.user_id)?;
        Ok(ReportListResponse {
            data,
            page: pagination.page,
            limit: pagination.limit,
            total,
        })
    })
    .await?;

    Ok(Json(response))
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub data: Report,
}

/// `GET /api/reports/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ReportResponse>, ApiError> {
    let id = parse_report_id(&id)?;

    let report = run_blocking(move || {
        let conn = ctx.open_db()?;
        get_report_for_user(&conn, &id, &user.user_id).map_err(ApiError::from)
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;

    Ok(Json(ReportResponse { data: report }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}

/// `DELETE /api/reports/:id` — ownership-checked hard delete.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_report_id(&id)?;

    run_blocking(move || {
        let conn = ctx.open_db()?;
        get_report_for_user(&conn, &id, &user.user_id)?
            .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;
        delete_report(&conn, &id)?;
        tracing::info!(report_id = %id, "report deleted by owner");
        Ok(())
    })
    .await?;

    Ok(Json(DeleteResponse {
        message: "Report deleted successfully",
    }))
}

fn parse_report_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid report id".into()))
}
