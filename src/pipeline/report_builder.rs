use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::resolver::{resolve_disease, resolve_treatments};
use super::PipelineError;
use crate::ai::client::GenerativeClient;
use crate::ai::{classify_image, recommend_treatment, UNKNOWN_LABEL};
use crate::db::repository::report::insert_report;
use crate::models::enums::TreatmentMethod;
use crate::models::{Report, SynthesizedTreatment, Treatment};

/// Reference to an image already ingested by the binary object store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestedImage {
    pub image_url: String,
    pub storage_id: String,
}

/// One treatment offered to the caller — either a curated catalog record or
/// a recommendation synthesized for this report. Both render to the same
/// wire shape, distinguished by `aiGenerated`.
#[derive(Debug, Clone)]
pub enum OfferedTreatment {
    Catalog(Treatment),
    Synthesized(SynthesizedTreatment),
}

impl OfferedTreatment {
    pub fn view(&self) -> TreatmentView {
        match self {
            Self::Catalog(t) => TreatmentView {
                id: Some(t.id),
                disease_id: Some(t.disease_id),
                method: t.method,
                steps: t.steps.clone(),
                image_url: t.image_url.clone(),
                approved: t.approved,
                ai_generated: false,
            },
            Self::Synthesized(s) => TreatmentView {
                id: None,
                disease_id: None,
                method: s.method,
                steps: s.steps.clone(),
                image_url: s.image_url.clone(),
                approved: s.approved,
                ai_generated: s.ai_generated,
            },
        }
    }
}

/// Uniform wire shape for catalog and synthesized treatments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_id: Option<Uuid>,
    pub method: TreatmentMethod,
    pub steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub approved: bool,
    pub ai_generated: bool,
}

/// Response view of a freshly created report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub report_id: Uuid,
    pub disease: String,
    pub confidence: f64,
    pub image_url: String,
    pub treatments: Vec<TreatmentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Run the full pipeline for one ingested image: diagnose, resolve the
/// disease and its treatments, persist the report, and assemble the
/// response view.
///
/// Adapter faults degrade internally; only invalid input and persistence
/// faults surface as errors.
pub fn build_report(
    conn: &Connection,
    client: &dyn GenerativeClient,
    user_id: Uuid,
    image: &IngestedImage,
) -> Result<ReportView, PipelineError> {
    if image.image_url.trim().is_empty() {
        return Err(PipelineError::InvalidImage("imageUrl must not be empty".into()));
    }
    if image.storage_id.trim().is_empty() {
        return Err(PipelineError::InvalidImage("storageId must not be empty".into()));
    }

    let classification = classify_image(client, &image.image_url).into_value();
    let disease = resolve_disease(conn, &classification.disease)?;
    let mut resolved = resolve_treatments(conn, client, disease.as_ref())?;

    if disease.is_none() {
        // No diagnosis — the report still carries generic care advice. The
        // recommendation prompt specializes on the "unknown" label.
        let generic = recommend_treatment(client, UNKNOWN_LABEL).into_value();
        resolved.synthesized = vec![generic.into_synthesized()];
    }

    let report = Report {
        id: Uuid::new_v4(),
        user_id,
        image_url: image.image_url.clone(),
        image_storage_id: image.storage_id.clone(),
        predicted_disease: classification.disease.clone(),
        confidence: classification.confidence,
        treatment_ids: resolved.curated.iter().map(|t| t.id).collect(),
        ai_treatments: resolved.synthesized.clone(),
        deleted: false,
        created_at: chrono::Utc::now().naive_utc(),
    };
    insert_report(conn, &report)?;

    tracing::info!(
        report_id = %report.id,
        disease = %report.predicted_disease,
        confidence = report.confidence,
        "report created"
    );

    let treatments = resolved
        .curated
        .into_iter()
        .map(OfferedTreatment::Catalog)
        .chain(resolved.synthesized.into_iter().map(OfferedTreatment::Synthesized))
        .map(|t| t.view())
        .collect();

    Ok(ReportView {
        report_id: report.id,
        disease: report.predicted_disease,
        confidence: report.confidence,
        image_url: report.image_url,
        treatments,
        note: resolved.note,
    })
}

/// Per-item outcome of a batch run. The envelope never fails because an
/// item did.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchItemView {
    Success {
        success: bool,
        #[serde(flatten)]
        report: ReportView,
    },
    Failure {
        success: bool,
        error: BatchItemError,
    },
}

#[derive(Debug, Serialize)]
pub struct BatchItemError {
    pub code: &'static str,
    pub message: String,
}

impl BatchItemView {
    fn success(report: ReportView) -> Self {
        Self::Success { success: true, report }
    }

    fn failure() -> Self {
        Self::Failure {
            success: false,
            error: BatchItemError {
                code: "PREDICTION_ERROR",
                message: "Failed to process image".into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Process a batch of ingested images independently, in input order.
///
/// A failing item occupies its result slot as `{success:false, error}` and
/// leaves every other item untouched; reports persisted for earlier items
/// stay persisted.
pub fn build_reports_batch(
    conn: &Connection,
    client: &dyn GenerativeClient,
    user_id: Uuid,
    images: &[IngestedImage],
) -> Vec<BatchItemView> {
    images
        .iter()
        .enumerate()
        .map(|(index, image)| match build_report(conn, client, user_id, image) {
            Ok(view) => BatchItemView::success(view),
            Err(e) => {
                tracing::warn!(index, error = %e, "batch item failed");
                BatchItemView::failure()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::MockGenerativeClient;
    use crate::db::repository::disease::get_disease_by_name;
    use crate::db::repository::report::get_report_for_user;
    use crate::db::repository::treatment::insert_treatment;
    use crate::db::sqlite::open_memory_database;
    use crate::pipeline::resolver::{AI_TREATMENT_NOTE, NO_TREATMENT_NOTE};

    const BLIGHT_DIAGNOSIS: &str =
        r#"{"disease": "Early Blight", "confidence": 0.87, "rationale": "target-spot lesions"}"#;
    const ORGANIC_RECOMMENDATION: &str =
        r#"{"method": "organic", "steps": ["Spray neem oil weekly"]}"#;

    fn image() -> IngestedImage {
        IngestedImage {
            image_url: "https://img.example/leaf.jpg".into(),
            storage_id: "leafscan/abc123".into(),
        }
    }

    fn blank_image() -> IngestedImage {
        IngestedImage {
            image_url: "  ".into(),
            storage_id: "leafscan/blank".into(),
        }
    }

    #[test]
    fn fresh_diagnosis_creates_disease_and_synthesizes() {
        let conn = open_memory_database().unwrap();
        let client = MockGenerativeClient::new()
            .with_vision(BLIGHT_DIAGNOSIS)
            .with_text(ORGANIC_RECOMMENDATION);
        let user = Uuid::new_v4();

        let view = build_report(&conn, &client, user, &image()).unwrap();
        assert_eq!(view.disease, "Early Blight");
        assert_eq!(view.confidence, 0.87);
        assert_eq!(view.note.as_deref(), Some(AI_TREATMENT_NOTE));
        assert_eq!(view.treatments.len(), 1);
        assert!(view.treatments[0].ai_generated);
        assert!(!view.treatments[0].approved);
        assert!(view.treatments[0].id.is_none());

        // Disease was created; report persisted with no catalog refs and
        // exactly one embedded synthesized treatment.
        let disease = get_disease_by_name(&conn, "early blight").unwrap().unwrap();
        assert_eq!(disease.name, "Early Blight");
        let report = get_report_for_user(&conn, &view.report_id, &user).unwrap().unwrap();
        assert_eq!(report.predicted_disease, "Early Blight");
        assert!(report.treatment_ids.is_empty());
        assert_eq!(report.ai_treatments.len(), 1);
        assert!(!report.ai_treatments[0].approved);
        assert!(report.ai_treatments[0].ai_generated);
    }

    #[test]
    fn approved_catalog_treatment_is_referenced_not_embedded() {
        let conn = open_memory_database().unwrap();
        let disease = resolve_disease(&conn, "Early Blight").unwrap().unwrap();
        let treatment = Treatment {
            id: Uuid::new_v4(),
            disease_id: disease.id,
            method: TreatmentMethod::Chemical,
            steps: vec!["Apply copper fungicide".into()],
            image_url: Some("https://img.example/copper.jpg".into()),
            approved: true,
            created_at: chrono::Utc::now().naive_utc(),
        };
        insert_treatment(&conn, &treatment).unwrap();

        let client = MockGenerativeClient::new().with_vision(BLIGHT_DIAGNOSIS);
        let user = Uuid::new_v4();
        let view = build_report(&conn, &client, user, &image()).unwrap();

        assert!(view.note.is_none());
        assert_eq!(view.treatments.len(), 1);
        let t = &view.treatments[0];
        assert_eq!(t.id, Some(treatment.id));
        assert_eq!(t.disease_id, Some(disease.id));
        assert!(t.approved);
        assert!(!t.ai_generated);

        let report = get_report_for_user(&conn, &view.report_id, &user).unwrap().unwrap();
        assert_eq!(report.treatment_ids, vec![treatment.id]);
        assert!(report.ai_treatments.is_empty());
    }

    #[test]
    fn unknown_diagnosis_persists_with_generic_fallback() {
        let conn = open_memory_database().unwrap();
        let client = MockGenerativeClient::new()
            .with_vision(r#"{"disease": "unknown", "confidence": 0.05}"#);
        let user = Uuid::new_v4();

        let view = build_report(&conn, &client, user, &image()).unwrap();
        assert_eq!(view.disease, "unknown");
        assert_eq!(view.note.as_deref(), Some(NO_TREATMENT_NOTE));
        assert_eq!(view.treatments.len(), 1);
        assert_eq!(view.treatments[0].method, TreatmentMethod::Cultural);
        assert!(view.treatments[0].ai_generated);

        // No Disease record was created or looked up.
        let diseases: i64 = conn
            .query_row("SELECT COUNT(*) FROM diseases", [], |r| r.get(0))
            .unwrap();
        assert_eq!(diseases, 0);

        let report = get_report_for_user(&conn, &view.report_id, &user).unwrap().unwrap();
        assert_eq!(report.predicted_disease, "unknown");
        assert_eq!(report.ai_treatments.len(), 1);
    }

    #[test]
    fn degraded_diagnosis_still_produces_a_report() {
        let conn = open_memory_database().unwrap();
        // Vision call fails outright; classification degrades to unknown.
        let client = MockGenerativeClient::new();
        let user = Uuid::new_v4();

        let view = build_report(&conn, &client, user, &image()).unwrap();
        assert_eq!(view.disease, "unknown");
        assert_eq!(view.confidence, 0.0);
        assert_eq!(view.treatments.len(), 1);
        assert!(get_report_for_user(&conn, &view.report_id, &user).unwrap().is_some());
    }

    #[test]
    fn invalid_image_reference_is_rejected() {
        let conn = open_memory_database().unwrap();
        let client = MockGenerativeClient::new().with_vision(BLIGHT_DIAGNOSIS);
        let err = build_report(&conn, &client, Uuid::new_v4(), &blank_image()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidImage(_)));

        let reports: i64 = conn
            .query_row("SELECT COUNT(*) FROM reports", [], |r| r.get(0))
            .unwrap();
        assert_eq!(reports, 0);
    }

    #[test]
    fn batch_isolates_failures_and_preserves_order() {
        let conn = open_memory_database().unwrap();
        let client = MockGenerativeClient::new()
            .with_vision(BLIGHT_DIAGNOSIS)
            .with_text(ORGANIC_RECOMMENDATION);
        let user = Uuid::new_v4();

        // Item 1 is invalid and must fail alone.
        let images = vec![image(), blank_image(), image()];
        let results = build_reports_batch(&conn, &client, user, &images);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[2].is_success());

        // The two successful reports are persisted.
        let reports: i64 = conn
            .query_row("SELECT COUNT(*) FROM reports", [], |r| r.get(0))
            .unwrap();
        assert_eq!(reports, 2);
    }

    #[test]
    fn batch_adapter_failure_degrades_item_without_failing_it() {
        let conn = open_memory_database().unwrap();
        // First vision call fails (degrades to unknown), second succeeds.
        let client = MockGenerativeClient::new()
            .queue_vision_failure()
            .with_vision(BLIGHT_DIAGNOSIS)
            .with_text(ORGANIC_RECOMMENDATION);
        let user = Uuid::new_v4();

        let results = build_reports_batch(&conn, &client, user, &[image(), image()]);
        assert!(results.iter().all(|r| r.is_success()));
        match &results[0] {
            BatchItemView::Success { report, .. } => assert_eq!(report.disease, "unknown"),
            BatchItemView::Failure { .. } => panic!("degraded item must not fail"),
        }
        match &results[1] {
            BatchItemView::Success { report, .. } => assert_eq!(report.disease, "Early Blight"),
            BatchItemView::Failure { .. } => panic!("healthy item must succeed"),
        }
    }

    #[test]
    fn batch_item_views_serialize_with_success_flag() {
        let conn = open_memory_database().unwrap();
        let client = MockGenerativeClient::new()
            .with_vision(BLIGHT_DIAGNOSIS)
            .with_text(ORGANIC_RECOMMENDATION);
        let results =
            build_reports_batch(&conn, &client, Uuid::new_v4(), &[image(), blank_image()]);

        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json[0]["success"], true);
        assert_eq!(json[0]["disease"], "Early Blight");
        assert!(json[0]["reportId"].is_string());
        assert_eq!(json[1]["success"], false);
        assert_eq!(json[1]["error"]["code"], "PREDICTION_ERROR");
    }
}
