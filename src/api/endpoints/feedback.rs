//! Feedback submission: at most one correctness judgment per (user, report).

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::run_blocking;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthUser};
use crate::db::repository::feedback::{get_feedback_for_report, insert_feedback};
use crate::db::repository::report::get_report_for_user;
use crate::models::feedback::MAX_NOTES_LEN;
use crate::models::Feedback;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub report_id: String,
    pub is_correct: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct FeedbackResponse {
    pub message: &'static str,
    pub data: Feedback,
}

/// `POST /api/feedback`
///
/// Ownership is checked first (a report belonging to someone else is
/// reported as missing), then the advisory duplicate check; the storage
/// UNIQUE constraint closes the race between concurrent submissions.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    let report_id = Uuid::parse_str(&payload.report_id)
        .map_err(|_| ApiError::Validation("Invalid report id".into()))?;

    if let Some(notes) = &payload.notes {
        if notes.chars().count() > MAX_NOTES_LEN {
            return Err(ApiError::Validation(format!(
                "Notes must be at most {MAX_NOTES_LEN} characters"
            )));
        }
    }

    let feedback = run_blocking(move || {
        let conn = ctx.open_db()?;

        get_report_for_user(&conn, &report_id, &user.user_id)?
            .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;

        if get_feedback_for_report(&conn, &report_id, &user.user_id)?.is_some() {
            return Err(ApiError::Conflict(
                "Feedback already submitted for this report".into(),
            ));
        }

        let feedback = Feedback {
            id: Uuid::new_v4(),
            report_id,
            user_id: user.user_id,
            is_correct: payload.is_correct,
            notes: payload.notes,
            created_at: chrono::Utc::now().naive_utc(),
        };
        match insert_feedback(&conn, &feedback) {
            Ok(()) => Ok(feedback),
            // Lost the race against a concurrent duplicate submission.
            Err(e) if e.is_unique_violation() => Err(ApiError::Conflict(
                "Feedback already submitted for this report".into(),
            )),
            Err(e) => Err(e.into()),
        }
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            message: "Feedback submitted successfully",
            data: feedback,
        }),
    ))
}
