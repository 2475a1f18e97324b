//! Admin curation: treatment catalog management and report oversight.
//!
//! This is how a synthesized recommendation becomes reusable: an admin
//! reviews the content from a report's embedded treatments and upserts it
//! with `approved = true`, after which treatment resolution for that
//! disease finds it and stops synthesizing.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::run_blocking;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthUser, PageQuery, Pagination};
use crate::db::repository::disease::get_disease;
use crate::db::repository::report::{count_all_reports, list_all_reports};
use crate::db::repository::treatment::{
    delete_treatment, get_treatment, insert_treatment, list_treatments, update_treatment,
    TreatmentFilter,
};
use crate::models::enums::TreatmentMethod;
use crate::models::{Report, Treatment};

const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Serialize)]
pub struct AdminReportsResponse {
    pub data: Vec<Report>,
    pub meta: PageMeta,
}

#[derive(Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// `GET /api/admin/reports?page&limit` — all users' non-deleted reports.
pub async fn list_reports(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AdminReportsResponse>, ApiError> {
    let pagination = Pagination::from_query(&query, DEFAULT_PAGE_SIZE);

    let response = run_blocking(move || {
        let conn = ctx.open_db()?;
        let data = list_all_reports(&conn, pagination.offset(), pagination.limit)?;
        let total = count_all_reports(&conn)?;
        Ok(AdminReportsResponse {
            data,
            meta: PageMeta {
                total,
                page: pagination.page,
                limit: pagination.limit,
            },
        })
    })
    .await?;

    Ok(Json(response))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentListQuery {
    #[serde(default)]
    pub disease_id: Option<String>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Serialize)]
pub struct TreatmentListResponse {
    pub data: Vec<Treatment>,
}

/// `GET /api/admin/treatments?diseaseId&approved&method`
pub async fn list_catalog(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthUser>,
    Query(query): Query<TreatmentListQuery>,
) -> Result<Json<TreatmentListResponse>, ApiError> {
    let filter = TreatmentFilter {
        disease_id: query
            .disease_id
            .map(|raw| {
                Uuid::parse_str(&raw).map_err(|_| ApiError::Validation("Invalid disease id".into()))
            })
            .transpose()?,
        approved: query.approved,
        method: query
            .method
            .map(|raw| TreatmentMethod::from_str(&raw).map_err(ApiError::from))
            .transpose()?,
    };

    let data = run_blocking(move || {
        let conn = ctx.open_db()?;
        list_treatments(&conn, &filter).map_err(ApiError::from)
    })
    .await?;

    Ok(Json(TreatmentListResponse { data }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertTreatmentRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub disease_id: String,
    pub method: String,
    pub steps: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub approved: Option<bool>,
}

#[derive(Serialize)]
pub struct TreatmentResponse {
    pub data: Treatment,
}

/// `POST /api/admin/treatments` — create, or update when `id` is present.
pub async fn upsert(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpsertTreatmentRequest>,
) -> Result<(StatusCode, Json<TreatmentResponse>), ApiError> {
    let (status, treatment) = apply_upsert(ctx, user, payload).await?;
    Ok((status, Json(TreatmentResponse { data: treatment })))
}

/// `PUT /api/admin/treatments/:id` — update by path id.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(mut payload): Json<UpsertTreatmentRequest>,
) -> Result<Json<TreatmentResponse>, ApiError> {
    payload.id = Some(id);
    let (_, treatment) = apply_upsert(ctx, user, payload).await?;
    Ok(Json(TreatmentResponse { data: treatment }))
}

async fn apply_upsert(
    ctx: ApiContext,
    user: AuthUser,
    payload: UpsertTreatmentRequest,
) -> Result<(StatusCode, Treatment), ApiError> {
    let validated = validate_payload(&payload)?;

    let result = run_blocking(move || {
        let conn = ctx.open_db()?;

        if get_disease(&conn, &validated.disease_id)?.is_none() {
            return Err(ApiError::NotFound("Disease not found".into()));
        }

        match validated.id {
            Some(id) => {
                let existing = get_treatment(&conn, &id)?
                    .ok_or_else(|| ApiError::NotFound("Treatment not found".into()))?;
                let updated = Treatment {
                    id,
                    disease_id: validated.disease_id,
                    method: validated.method,
                    steps: validated.steps,
                    image_url: validated.image_url,
                    approved: validated.approved.unwrap_or(existing.approved),
                    created_at: existing.created_at,
                };
                update_treatment(&conn, &updated)?;
                tracing::info!(
                    treatment_id = %updated.id,
                    approved = updated.approved,
                    admin = %user.user_id,
                    "treatment updated"
                );
                Ok((StatusCode::OK, updated))
            }
            None => {
                let treatment = Treatment {
                    id: Uuid::new_v4(),
                    disease_id: validated.disease_id,
                    method: validated.method,
                    steps: validated.steps,
                    image_url: validated.image_url,
                    approved: validated.approved.unwrap_or(false),
                    created_at: chrono::Utc::now().naive_utc(),
                };
                insert_treatment(&conn, &treatment)?;
                tracing::info!(
                    treatment_id = %treatment.id,
                    approved = treatment.approved,
                    admin = %user.user_id,
                    "treatment created"
                );
                Ok((StatusCode::CREATED, treatment))
            }
        }
    })
    .await?;

    Ok(result)
}

struct ValidatedUpsert {
    id: Option<Uuid>,
    disease_id: Uuid,
    method: TreatmentMethod,
    steps: Vec<String>,
    image_url: Option<String>,
    approved: Option<bool>,
}

fn validate_payload(payload: &UpsertTreatmentRequest) -> Result<ValidatedUpsert, ApiError> {
    let id = payload
        .id
        .as_deref()
        .map(|raw| {
            Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid treatment id".into()))
        })
        .transpose()?;

    let disease_id = Uuid::parse_str(&payload.disease_id)
        .map_err(|_| ApiError::Validation("Invalid disease id".into()))?;

    let method = TreatmentMethod::from_str(payload.method.trim())
        .map_err(|_| ApiError::Validation(
            "Method must be one of: organic, chemical, cultural, integrated".into(),
        ))?;

    let steps: Vec<String> = payload
        .steps
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if steps.is_empty() {
        return Err(ApiError::Validation("At least one step is required".into()));
    }

    if let Some(url) = &payload.image_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ApiError::Validation("Invalid image URL".into()));
        }
    }

    Ok(ValidatedUpsert {
        id,
        disease_id,
        method,
        steps,
        image_url: payload.image_url.clone(),
        approved: payload.approved,
    })
}

/// `DELETE /api/admin/treatments/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::Validation("Invalid treatment id".into()))?;

    let removed = run_blocking(move || {
        let conn = ctx.open_db()?;
        delete_treatment(&conn, &id).map_err(ApiError::from)
    })
    .await?;

    if !removed {
        return Err(ApiError::NotFound("Treatment not found".into()));
    }
    tracing::info!(treatment_id = %id, admin = %user.user_id, "treatment deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_payload() -> UpsertTreatmentRequest {
        UpsertTreatmentRequest {
            id: None,
            disease_id: Uuid::new_v4().to_string(),
            method: "organic".into(),
            steps: vec!["Spray neem oil weekly".into()],
            image_url: None,
            approved: Some(true),
        }
    }

    #[test]
    fn valid_payload_passes() {
        let validated = validate_payload(&base_payload()).unwrap();
        assert_eq!(validated.method, TreatmentMethod::Organic);
        assert_eq!(validated.steps.len(), 1);
        assert_eq!(validated.approved, Some(true));
    }

    #[test]
    fn bad_method_rejected() {
        let mut payload = base_payload();
        payload.method = "voodoo".into();
        assert!(validate_payload(&payload).is_err());
    }

    #[test]
    fn empty_steps_rejected() {
        let mut payload = base_payload();
        payload.steps = vec!["   ".into()];
        assert!(validate_payload(&payload).is_err());
    }

    #[test]
    fn non_http_image_url_rejected() {
        let mut payload = base_payload();
        payload.image_url = Some("ftp://img.example/x.jpg".into());
        assert!(validate_payload(&payload).is_err());
    }

    #[test]
    fn malformed_ids_rejected() {
        let mut payload = base_payload();
        payload.disease_id = "not-a-uuid".into();
        assert!(validate_payload(&payload).is_err());

        let mut payload = base_payload();
        payload.id = Some("nope".into());
        assert!(validate_payload(&payload).is_err());
    }
}
