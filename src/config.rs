use std::path::PathBuf;

/// Application configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the backend REST collaborator.
    pub api_base_url: String,
    /// Bearer token issued by the auth collaborator.
    pub auth_token: Option<String>,
    /// Path of the local key/value state file.
    pub state_path: PathBuf,
    /// Debounce window between an auth-state change and the identity sync.
    pub sync_debounce_ms: u64,
    /// Identity of the acting user (issued by the auth collaborator).
    pub user_id: Option<String>,
    pub user_email: Option<String>,
}

/// Loads configuration from the environment, with defaults.
pub fn load() -> AppConfig {
    dotenvy::dotenv().ok();
    AppConfig {
        api_base_url: std::env::var("HEARTH_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/v1".to_string()),
        auth_token: std::env::var("HEARTH_AUTH_TOKEN").ok(),
        state_path: std::env::var("HEARTH_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("hearth-state.json")),
        sync_debounce_ms: std::env::var("HEARTH_SYNC_DEBOUNCE_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(400),
        user_id: std::env::var("HEARTH_USER_ID").ok(),
        user_email: std::env::var("HEARTH_USER_EMAIL").ok(),
    }
}
