use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::TreatmentMethod;

/// A treatment synthesized by the recommendation model, embedded directly in
/// a report rather than persisted as a catalog record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedTreatment {
    pub method: TreatmentMethod,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub approved: bool,
    pub ai_generated: bool,
}

/// Durable record of one diagnosis event for one user. Immutable after
/// creation apart from deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub image_storage_id: String,
    pub predicted_disease: String,
    pub confidence: f64,
    pub treatment_ids: Vec<Uuid>,
    pub ai_treatments: Vec<SynthesizedTreatment>,
    pub deleted: bool,
    pub created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_treatment_wire_shape() {
        let t = SynthesizedTreatment {
            method: TreatmentMethod::Cultural,
            steps: vec!["Remove affected leaves".into()],
            image_url: None,
            approved: false,
            ai_generated: true,
        };
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["method"], "cultural");
        assert_eq!(json["approved"], false);
        assert_eq!(json["aiGenerated"], true);
        assert!(json.get("imageUrl").is_none());
    }
}
