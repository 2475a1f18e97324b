use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of the free-text notes field.
pub const MAX_NOTES_LEN: usize = 1000;

/// One correctness judgment for one report. At most one per
/// (report, user) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub report_id: Uuid,
    pub user_id: Uuid,
    pub is_correct: bool,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}
