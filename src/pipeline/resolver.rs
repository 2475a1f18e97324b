use rusqlite::Connection;

use crate::ai::client::GenerativeClient;
use crate::ai::{recommend_treatment, UNKNOWN_LABEL};
use crate::db::repository::disease::find_or_create_disease;
use crate::db::repository::treatment::get_approved_treatments;
use crate::db::DatabaseError;
use crate::models::{Disease, SynthesizedTreatment, Treatment};

/// Note returned when no disease could be resolved.
pub const NO_TREATMENT_NOTE: &str = "No curated treatment found; consult an expert.";
/// Note returned alongside a synthesized (ai-generated) treatment.
pub const AI_TREATMENT_NOTE: &str = "AI-generated treatment; verify with an expert.";

/// Map a diagnosed label to its canonical Disease record, creating one on
/// first sight. `"unknown"` resolves to nothing — no lookup, no record.
pub fn resolve_disease(conn: &Connection, label: &str) -> Result<Option<Disease>, DatabaseError> {
    if label.trim().is_empty() || label.eq_ignore_ascii_case(UNKNOWN_LABEL) {
        return Ok(None);
    }
    find_or_create_disease(conn, label.trim()).map(Some)
}

/// Treatments resolved for one diagnosis: curated approved catalog records,
/// or a synthesized recommendation when the catalog has none.
#[derive(Debug, Clone)]
pub struct ResolvedTreatments {
    pub curated: Vec<Treatment>,
    pub synthesized: Vec<SynthesizedTreatment>,
    pub note: Option<String>,
}

impl ResolvedTreatments {
    fn empty_with_note(note: &str) -> Self {
        Self {
            curated: Vec::new(),
            synthesized: Vec::new(),
            note: Some(note.to_string()),
        }
    }
}

/// Resolve treatments for a disease.
///
/// For a known disease this never comes back empty: when no approved catalog
/// record exists, the recommendation adapter's fallback guarantees exactly
/// one synthesized candidate.
pub fn resolve_treatments(
    conn: &Connection,
    client: &dyn GenerativeClient,
    disease: Option<&Disease>,
) -> Result<ResolvedTreatments, DatabaseError> {
    let Some(disease) = disease else {
        return Ok(ResolvedTreatments::empty_with_note(NO_TREATMENT_NOTE));
    };

    let curated = get_approved_treatments(conn, &disease.id)?;
    if !curated.is_empty() {
        return Ok(ResolvedTreatments {
            curated,
            synthesized: Vec::new(),
            note: None,
        });
    }

    let recommendation = recommend_treatment(client, &disease.name);
    tracing::debug!(
        disease = %disease.name,
        degraded = recommendation.is_degraded(),
        "no approved treatments in catalog; synthesized a recommendation"
    );

    Ok(ResolvedTreatments {
        curated: Vec::new(),
        synthesized: vec![recommendation.into_value().into_synthesized()],
        note: Some(AI_TREATMENT_NOTE.to_string()),
    })
}
