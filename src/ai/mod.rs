//! Adapters for the external generative model.
//!
//! Transport and parse faults never escape this module as errors: every
//! adapter returns a usable payload, tagged `Degraded` when it is a fixed
//! fallback rather than a parsed model response.

pub mod advise;
pub mod classify;
pub mod client;
pub mod parser;
pub mod prompts;

pub use advise::{answer_care_question, recommend_treatment, CareAnswer, Recommendation};
pub use classify::{classify_image, Classification, UNKNOWN_LABEL};
pub use client::{GeminiClient, GenerativeClient};

use thiserror::Error;

/// Faults from the model transport layer. Internal to the adapters; callers
/// above them only ever see `ModelOutput`.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Cannot reach model service at {0}")]
    Connection(String),

    #[error("Model request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Model service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Failed to parse model response: {0}")]
    ResponseParsing(String),

    #[error("Model response contained no candidates")]
    EmptyResponse,
}

/// An adapter result that is always usable. `Parsed` carries a genuine model
/// answer; `Degraded` carries the adapter's fixed fallback for that call.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput<T> {
    Parsed(T),
    Degraded(T),
}

impl<T> ModelOutput<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Parsed(v) | Self::Degraded(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Parsed(v) | Self::Degraded(v) => v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_unwraps_either_variant() {
        assert_eq!(*ModelOutput::Parsed(1).value(), 1);
        assert_eq!(ModelOutput::Degraded(2).into_value(), 2);
        assert!(ModelOutput::Degraded(()).is_degraded());
        assert!(!ModelOutput::Parsed(()).is_degraded());
    }
}
