use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use leafscan::ai::GeminiClient;
use leafscan::api::server::serve;
use leafscan::api::types::ApiContext;
use leafscan::config::{self, Settings};
use leafscan::db::repository::admin::ensure_admin;
use leafscan::db::sqlite::open_database;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let settings = Settings::from_env();

    if let Some(parent) = settings.database_path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create data directory");
    }

    // Open once at startup to run migrations; requests open their own
    // connections afterwards.
    let conn = open_database(&settings.database_path).expect("Failed to open database");

    // Optional bootstrap: grant admin rights to an externally-issued user id.
    if let Ok(raw) = std::env::var("LEAFSCAN_ADMIN_USER") {
        match raw.parse() {
            Ok(user_id) => {
                let admin = ensure_admin(&conn, &user_id).expect("Failed to bootstrap admin");
                tracing::info!(user_id = %admin.user_id, "admin bootstrap ensured");
            }
            Err(_) => tracing::warn!("LEAFSCAN_ADMIN_USER is not a valid user id; skipping"),
        }
    }
    drop(conn);

    let model = Arc::new(GeminiClient::from_settings(&settings.model));
    let ctx = ApiContext::new(settings.database_path.clone(), model);

    serve(ctx, settings.bind_addr)
        .await
        .expect("error while running leafscan");
}
