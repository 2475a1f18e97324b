pub mod admin;
pub mod chat;
pub mod feedback;
pub mod health;
pub mod predict;
pub mod reports;
pub mod treatments;

use crate::api::error::ApiError;

/// Run blocking pipeline/persistence work off the async executor.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task: {e}")))?
}
