pub mod admin;
pub mod disease;
pub mod feedback;
pub mod report;
pub mod treatment;

pub use admin::*;
pub use disease::*;
pub use feedback::*;
pub use report::*;
pub use treatment::*;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::DatabaseError;

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub(crate) fn parse_timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .unwrap_or_default()
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn decode_json<T: DeserializeOwned>(field: &str, s: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(s).map_err(|e| DatabaseError::MalformedValue {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn encode_json<T: Serialize>(field: &str, value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::MalformedValue {
        field: field.to_string(),
        reason: e.to_string(),
    })
}
