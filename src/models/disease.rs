use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical disease record. Created lazily on first diagnosis of a
/// previously unseen label; names are unique case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub created_at: NaiveDateTime,
}

impl Disease {
    /// A fresh record for a newly diagnosed label.
    pub fn from_label(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("Information about {name}"),
            symptoms: Vec::new(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
