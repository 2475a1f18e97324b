use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Leafscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when LEAFSCAN_LOG / RUST_LOG are unset.
pub fn default_log_filter() -> &'static str {
    "info,leafscan=debug"
}

/// Get the application data directory (~/Leafscan/ on all platforms)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Leafscan")
}

/// Default database location under the application data directory.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("leafscan.db")
}

/// Generative model (Gemini-style API) connection settings.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl ModelSettings {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("LEAFSCAN_MODEL_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            api_key: std::env::var("LEAFSCAN_MODEL_API_KEY").unwrap_or_default(),
            model: std::env::var("LEAFSCAN_MODEL")
                .unwrap_or_else(|_| "gemini-pro-vision".into()),
            timeout_secs: std::env::var("LEAFSCAN_MODEL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}

/// Service settings, resolved from the environment with sensible defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub model: ModelSettings,
}

impl Settings {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("LEAFSCAN_BIND")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| "127.0.0.1:8080".parse().expect("valid default bind address"));

        let database_path = std::env::var("LEAFSCAN_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        Self {
            bind_addr,
            database_path,
            model: ModelSettings::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Leafscan"));
    }

    #[test]
    fn default_database_under_app_data() {
        let db = default_database_path();
        assert!(db.starts_with(app_data_dir()));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn model_settings_have_defaults() {
        let settings = ModelSettings::from_env();
        assert!(!settings.base_url.is_empty());
        assert!(!settings.model.is_empty());
        assert!(settings.timeout_secs > 0);
    }
}
