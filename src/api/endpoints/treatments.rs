//! Treatment lookup by disease name.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;

use super::run_blocking;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthUser};
use crate::pipeline::report_builder::OfferedTreatment;
use crate::pipeline::{resolve_disease, resolve_treatments, TreatmentView};

#[derive(Serialize)]
pub struct TreatmentsResponse {
    pub treatments: Vec<TreatmentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// `GET /api/treatments/:disease`
///
/// Find-or-create semantics for the named disease, then the standard
/// treatment resolution: curated catalog records if any, otherwise one
/// synthesized recommendation.
pub async fn by_disease(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthUser>,
    Path(disease_name): Path<String>,
) -> Result<Json<TreatmentsResponse>, ApiError> {
    let response = run_blocking(move || {
        let conn = ctx.open_db()?;
        let disease = resolve_disease(&conn, &disease_name)?;
        let resolved = resolve_treatments(&conn, ctx.model.as_ref(), disease.as_ref())?;

        let treatments = resolved
            .curated
            .into_iter()
            .map(OfferedTreatment::Catalog)
            .chain(resolved.synthesized.into_iter().map(OfferedTreatment::Synthesized))
            .map(|t| t.view())
            .collect();

        Ok(TreatmentsResponse {
            treatments,
            note: resolved.note,
        })
    })
    .await?;

    Ok(Json(response))
}
