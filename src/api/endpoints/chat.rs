//! Free-form plant care questions.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use super::run_blocking;
use crate::ai::{answer_care_question, CareAnswer};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthUser};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// `POST /api/chat` — never fails on model trouble; the adapter's degraded
/// answer is still a valid response.
pub async fn ask(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthUser>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<CareAnswer>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::Validation("Message must not be empty".into()));
    }

    let answer = run_blocking(move || {
        Ok(answer_care_question(ctx.model.as_ref(), &payload.message).into_value())
    })
    .await?;

    Ok(Json(answer))
}
