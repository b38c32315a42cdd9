use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "quickadd";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// AI calls allowed per user per day.
pub const DEFAULT_DAILY_AI_LIMIT: u32 = 1000;
pub const DEFAULT_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 30;
/// Low temperature keeps the JSON drafts deterministic.
pub const CHAT_TEMPERATURE: f32 = 0.3;

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> &'static str {
    "quickadd=info"
}

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(".quickadd")
}

/// Get the default database location
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("quickadd.db")
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct QuickAddConfig {
    pub api_key: Option<String>,
    pub chat_url: String,
    pub chat_model: String,
    pub chat_timeout_secs: u64,
    pub daily_ai_limit: u32,
}

impl Default for QuickAddConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            chat_url: DEFAULT_CHAT_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            chat_timeout_secs: DEFAULT_CHAT_TIMEOUT_SECS,
            daily_ai_limit: DEFAULT_DAILY_AI_LIMIT,
        }
    }
}

impl QuickAddConfig {
    /// Defaults overridden by QUICKADD_API_KEY, QUICKADD_CHAT_URL,
    /// QUICKADD_CHAT_MODEL, QUICKADD_CHAT_TIMEOUT_SECS and
    /// QUICKADD_DAILY_LIMIT. Blank values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.api_key = std::env::var("QUICKADD_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        if let Ok(url) = std::env::var("QUICKADD_CHAT_URL") {
            if !url.trim().is_empty() {
                config.chat_url = url;
            }
        }
        if let Ok(model) = std::env::var("QUICKADD_CHAT_MODEL") {
            if !model.trim().is_empty() {
                config.chat_model = model;
            }
        }
        if let Ok(secs) = std::env::var("QUICKADD_CHAT_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse() {
                config.chat_timeout_secs = parsed;
            }
        }
        if let Ok(limit) = std::env::var("QUICKADD_DAILY_LIMIT") {
            if let Ok(parsed) = limit.parse() {
                config.daily_ai_limit = parsed;
            }
        }

        config
    }
}
