use serde::{Deserialize, Serialize};

use super::client::GenerativeClient;
use super::{parser, prompts, ModelOutput};

/// Label reported when the model cannot or did not identify a disease.
/// Never resolved to a Disease record.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Diagnosis produced from one plant image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub disease: String,
    pub confidence: f64,
    pub rationale: Option<String>,
}

impl Classification {
    fn degraded(confidence: f64, rationale: &str) -> Self {
        Self {
            disease: UNKNOWN_LABEL.to_string(),
            confidence,
            rationale: Some(rationale.to_string()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.disease == UNKNOWN_LABEL
    }
}

/// Lenient parse target; the model's JSON is not trusted to be complete.
#[derive(Deserialize)]
struct RawClassification {
    #[serde(default)]
    disease: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    rationale: Option<String>,
}

/// Diagnose a plant image.
///
/// Never fails: transport faults degrade to `{unknown, 0.0}`, unparseable
/// model output to `{unknown, 0.1}`. A parsed-but-unsure answer is
/// normalized so that `UNKNOWN_LABEL` always carries confidence <= 0.1.
pub fn classify_image(client: &dyn GenerativeClient, image_url: &str) -> ModelOutput<Classification> {
    let text = match client.generate_vision(&prompts::classification_prompt(), image_url) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "diagnosis model call failed");
            return ModelOutput::Degraded(Classification::degraded(0.0, "model service error"));
        }
    };

    let raw: RawClassification = match parser::extract_json_object(&text)
        .and_then(|json| serde_json::from_str(json).ok())
    {
        Some(raw) => raw,
        None => {
            tracing::warn!("diagnosis response was not parseable JSON");
            return ModelOutput::Degraded(Classification::degraded(
                0.1,
                "failed to parse model response",
            ));
        }
    };

    ModelOutput::Parsed(normalize(raw))
}

fn normalize(raw: RawClassification) -> Classification {
    let disease = raw.disease.trim();
    let mut confidence = if raw.confidence.is_finite() {
        raw.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };

    if disease.is_empty() || disease.eq_ignore_ascii_case(UNKNOWN_LABEL) {
        confidence = confidence.min(0.1);
        return Classification {
            disease: UNKNOWN_LABEL.to_string(),
            confidence,
            rationale: raw.rationale,
        };
    }

    Classification {
        disease: disease.to_string(),
        confidence,
        rationale: raw.rationale,
    }
}
