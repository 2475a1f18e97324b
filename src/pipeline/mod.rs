//! Classification & treatment resolution pipeline.
//!
//! One invocation takes an ingested image through diagnosis, disease-record
//! resolution, treatment lookup (or synthesis), and durable report creation.

pub mod report_builder;
pub mod resolver;

pub use report_builder::{
    build_report, build_reports_batch, BatchItemView, IngestedImage, ReportView, TreatmentView,
};
pub use resolver::{resolve_disease, resolve_treatments, ResolvedTreatments};

use thiserror::Error;

use crate::db::DatabaseError;

/// Faults that escape the report builder. Adapter failures never appear
/// here — they degrade inside the adapters.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("invalid image reference: {0}")]
    InvalidImage(String),
}
