//! Shared types for the API layer.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use crate::ai::client::GenerativeClient;
use crate::api::error::ApiError;
use crate::db::sqlite::open_database;

/// Shared context for all API routes and middleware: where the database
/// lives and which model client to talk to. Each request opens its own
/// connection — no mutable state is shared between requests.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: PathBuf,
    pub model: Arc<dyn GenerativeClient>,
}

impl ApiContext {
    pub fn new(db_path: PathBuf, model: Arc<dyn GenerativeClient>) -> Self {
        Self { db_path, model }
    }

    pub fn open_db(&self) -> Result<Connection, ApiError> {
        open_database(&self.db_path).map_err(|e| ApiError::Internal(format!("Database: {e}")))
    }
}

/// Authenticated principal, injected into request extensions by the auth
/// middleware. Session issuance and validation live upstream; the bearer
/// token carries the externally-issued user id.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Raw page/limit query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Normalized pagination: page >= 1, limit clamped to 1..=100.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn from_query(query: &PageQuery, default_limit: i64) -> Self {
        Self {
            page: query.page.unwrap_or(1).max(1),
            limit: query.limit.unwrap_or(default_limit).clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}
