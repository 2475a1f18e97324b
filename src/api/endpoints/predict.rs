//! Prediction endpoints — the pipeline's HTTP face.
//!
//! `POST /api/predict` runs a single ingested image through classification,
//! disease/treatment resolution, and report creation. `POST
//! /api/predict/batch` does the same for up to [`MAX_BATCH`] images with
//! per-item failure isolation: the envelope is 201 even when items fail.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use super::run_blocking;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthUser};
use crate::pipeline::{build_report, build_reports_batch, BatchItemView, IngestedImage, ReportView};

/// Maximum images per batch request.
pub const MAX_BATCH: usize = 10;

/// `POST /api/predict`
pub async fn predict(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthUser>,
    Json(image): Json<IngestedImage>,
) -> Result<(StatusCode, Json<ReportView>), ApiError> {
    let view = run_blocking(move || {
        let conn = ctx.open_db()?;
        build_report(&conn, ctx.model.as_ref(), user.user_id, &image).map_err(ApiError::from)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Deserialize)]
pub struct BatchPredictRequest {
    pub images: Vec<IngestedImage>,
}

#[derive(Serialize)]
pub struct BatchPredictResponse {
    pub results: Vec<BatchItemView>,
}

/// `POST /api/predict/batch`
pub async fn predict_batch(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<BatchPredictRequest>,
) -> Result<(StatusCode, Json<BatchPredictResponse>), ApiError> {
    if payload.images.is_empty() {
        return Err(ApiError::Validation("No images in batch".into()));
    }
    if payload.images.len() > MAX_BATCH {
        return Err(ApiError::Validation(format!(
            "Maximum {MAX_BATCH} images per batch"
        )));
    }

    let results = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(build_reports_batch(
            &conn,
            ctx.model.as_ref(),
            user.user_id,
            &payload.images,
        ))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(BatchPredictResponse { results })))
}
