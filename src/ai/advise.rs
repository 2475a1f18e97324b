use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::client::GenerativeClient;
use super::{parser, prompts, ModelOutput};
use crate::models::enums::TreatmentMethod;
use crate::models::SynthesizedTreatment;

const FALLBACK_STEPS: [&str; 4] = [
    "Remove affected parts of the plant",
    "Improve air circulation around the plant",
    "Avoid overhead watering",
    "Monitor the plant regularly for signs of improvement",
];

const FALLBACK_NOTES: &str = "Consult with a local plant expert for specific advice";
const FALLBACK_SERVICE_NOTES: &str =
    "Model service error. Consult with a local plant expert for specific advice";

const FALLBACK_ANSWER: &str = "I'm sorry, I couldn't process your question. \
     Please try again or consult with a plant expert.";
const FALLBACK_SERVICE_ANSWER: &str = "I'm experiencing technical difficulties. \
     Please try again later or consult with a plant expert.";

/// A treatment recommendation for a named disease.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub method: TreatmentMethod,
    pub steps: Vec<String>,
    pub notes: Option<String>,
}

impl Recommendation {
    /// The fixed conservative fallback: generic cultural care plus an
    /// expert-consultation notice.
    fn fallback(notes: &str) -> Self {
        Self {
            method: TreatmentMethod::Cultural,
            steps: FALLBACK_STEPS.iter().map(|s| s.to_string()).collect(),
            notes: Some(notes.to_string()),
        }
    }

    /// Wrap as an embeddable, unapproved, ai-generated treatment.
    pub fn into_synthesized(self) -> SynthesizedTreatment {
        SynthesizedTreatment {
            method: self.method,
            steps: self.steps,
            image_url: None,
            approved: false,
            ai_generated: true,
        }
    }
}

#[derive(Deserialize)]
struct RawRecommendation {
    #[serde(default)]
    method: String,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// Recommend a treatment for a disease name.
///
/// Never fails — downstream code has no other fallback path. Invalid method
/// values and empty step lists degrade exactly like transport faults.
pub fn recommend_treatment(
    client: &dyn GenerativeClient,
    disease_name: &str,
) -> ModelOutput<Recommendation> {
    let text = match client.generate(&prompts::recommendation_prompt(disease_name)) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(disease = disease_name, error = %e, "recommendation model call failed");
            return ModelOutput::Degraded(Recommendation::fallback(FALLBACK_SERVICE_NOTES));
        }
    };

    let raw: RawRecommendation = match parser::extract_json_object(&text)
        .and_then(|json| serde_json::from_str(json).ok())
    {
        Some(raw) => raw,
        None => {
            tracing::warn!(disease = disease_name, "recommendation response was not parseable JSON");
            return ModelOutput::Degraded(Recommendation::fallback(FALLBACK_NOTES));
        }
    };

    match validate(raw) {
        Some(recommendation) => ModelOutput::Parsed(recommendation),
        None => {
            tracing::warn!(disease = disease_name, "recommendation response failed validation");
            ModelOutput::Degraded(Recommendation::fallback(FALLBACK_NOTES))
        }
    }
}

fn validate(raw: RawRecommendation) -> Option<Recommendation> {
    let method = TreatmentMethod::from_str(raw.method.trim().to_ascii_lowercase().as_str()).ok()?;
    let steps: Vec<String> = raw
        .steps
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if steps.is_empty() {
        return None;
    }
    Some(Recommendation {
        method,
        steps,
        notes: raw.notes,
    })
}

/// Answer to a free-form plant care question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareAnswer {
    pub answer: String,
    pub sources: Vec<String>,
}

#[derive(Deserialize)]
struct RawCareAnswer {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    sources: Vec<String>,
}

/// Answer a plant care question. Never fails; degraded output is a fixed
/// apology with an expert-consultation notice.
pub fn answer_care_question(client: &dyn GenerativeClient, message: &str) -> ModelOutput<CareAnswer> {
    let fallback = |answer: &str| CareAnswer {
        answer: answer.to_string(),
        sources: Vec::new(),
    };

    let text = match client.generate(&prompts::care_question_prompt(message)) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "care question model call failed");
            return ModelOutput::Degraded(fallback(FALLBACK_SERVICE_ANSWER));
        }
    };

    let raw: Option<RawCareAnswer> = parser::extract_json_object(&text)
        .and_then(|json| serde_json::from_str(json).ok());

    match raw {
        Some(raw) if !raw.answer.trim().is_empty() => ModelOutput::Parsed(CareAnswer {
            answer: raw.answer,
            sources: raw.sources,
        }),
        _ => {
            tracing::warn!("care question response was not parseable JSON");
            ModelOutput::Degraded(fallback(FALLBACK_ANSWER))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::MockGenerativeClient;

    #[test]
    fn parses_well_formed_recommendation() {
        let client = MockGenerativeClient::new().with_text(
            r#"{"method": "organic", "steps": ["Spray neem oil weekly", "Remove fallen leaves"], "notes": "Reapply after rain"}"#,
        );
        let output = recommend_treatment(&client, "Early Blight");
        assert!(!output.is_degraded());
        let r = output.into_value();
        assert_eq!(r.method, TreatmentMethod::Organic);
        assert_eq!(r.steps.len(), 2);
        assert_eq!(r.notes.as_deref(), Some("Reapply after rain"));
    }

    #[test]
    fn transport_failure_returns_generic_care() {
        let client = MockGenerativeClient::new();
        let output = recommend_treatment(&client, "Early Blight");
        assert!(output.is_degraded());
        let r = output.into_value();
        assert_eq!(r.method, TreatmentMethod::Cultural);
        assert_eq!(r.steps.len(), 4);
        assert!(r.notes.unwrap().starts_with("Model service error"));
    }

    #[test]
    fn garbage_response_returns_generic_care() {
        let client = MockGenerativeClient::new().with_text("try watering less maybe");
        let output = recommend_treatment(&client, "Leaf Spot");
        assert!(output.is_degraded());
        assert_eq!(output.value().steps.len(), 4);
    }

    #[test]
    fn invalid_method_degrades() {
        let client = MockGenerativeClient::new()
            .with_text(r#"{"method": "homeopathic", "steps": ["dilute and shake"]}"#);
        let output = recommend_treatment(&client, "Rust");
        assert!(output.is_degraded());
        assert_eq!(output.value().method, TreatmentMethod::Cultural);
    }

    #[test]
    fn empty_steps_degrade() {
        let client = MockGenerativeClient::new()
            .with_text(r#"{"method": "organic", "steps": ["  ", ""]}"#);
        let output = recommend_treatment(&client, "Rust");
        assert!(output.is_degraded());
    }

    #[test]
    fn method_is_case_folded() {
        let client = MockGenerativeClient::new()
            .with_text(r#"{"method": "Integrated", "steps": ["Scout twice a week"]}"#);
        let output = recommend_treatment(&client, "Canker");
        assert!(!output.is_degraded());
        assert_eq!(output.value().method, TreatmentMethod::Integrated);
    }

    #[test]
    fn synthesized_wrapper_is_unapproved_and_tagged() {
        let client = MockGenerativeClient::new();
        let synthesized = recommend_treatment(&client, "Early Blight")
            .into_value()
            .into_synthesized();
        assert!(!synthesized.approved);
        assert!(synthesized.ai_generated);
        assert!(synthesized.image_url.is_none());
    }

    #[test]
    fn care_answer_parses() {
        let client = MockGenerativeClient::new().with_text(
            r#"{"answer": "Yellow basil leaves usually mean overwatering.", "sources": ["General horticulture guidance"]}"#,
        );
        let output = answer_care_question(&client, "why are my basil leaves yellow?");
        assert!(!output.is_degraded());
        let a = output.into_value();
        assert!(a.answer.contains("overwatering"));
        assert_eq!(a.sources.len(), 1);
    }

    #[test]
    fn care_answer_degrades_on_failure() {
        let client = MockGenerativeClient::new();
        let output = answer_care_question(&client, "help");
        assert!(output.is_degraded());
        assert!(output.value().answer.contains("technical difficulties"));
    }

    #[test]
    fn care_answer_degrades_on_garbage() {
        let client = MockGenerativeClient::new().with_text("water it");
        let output = answer_care_question(&client, "help");
        assert!(output.is_degraded());
        assert!(output.value().answer.contains("couldn't process"));
    }
}
