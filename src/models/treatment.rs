use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::TreatmentMethod;

/// Curated catalog treatment tied to a disease. Only `approved` records are
/// offered to users automatically; unapproved ones await admin review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub id: Uuid,
    pub disease_id: Uuid,
    pub method: TreatmentMethod,
    pub steps: Vec<String>,
    pub image_url: Option<String>,
    pub approved: bool,
    pub created_at: NaiveDateTime,
}
