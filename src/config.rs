use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,

    /// Base URL of the WordPress site that issues licenses
    pub wordpress_base_url: String,
    pub license_verify_path: String,
    pub license_timeout: Duration,
    pub llm_timeout: Duration,

    /// Optional outbound proxy for every HTTP client
    pub proxy_url: Option<String>,

    /// Comma-separated Telegram user IDs of admins
    pub admin_ids: Vec<i64>,

    /// License result cache
    pub cache_ttl: Duration,
    pub cache_max_size: usize,

    /// Directory holding `<section>.json`, `<section>_admin.json`, tutorials and the archive
    pub content_dir: PathBuf,

    /// Postgres user-state store. In-memory when unset.
    pub database_url: Option<String>,

    /// Free-tier quota for every limited section
    pub free_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: String::new(),
            openai_api_key: String::new(),
            openai_model: "gpt-4".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            wordpress_base_url: "https://mirallino.ir".to_string(),
            license_verify_path: "/wp-json/licensing/v1/verify".to_string(),
            license_timeout: Duration::from_secs(10),
            llm_timeout: Duration::from_secs(60),
            proxy_url: None,
            admin_ids: Vec::new(),
            cache_ttl: Duration::from_secs(3600),
            cache_max_size: 1000,
            content_dir: PathBuf::from("content"),
            database_url: None,
            free_limit: 3,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN")?,
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or(defaults.openai_base_url),
            wordpress_base_url: std::env::var("WORDPRESS_BASE_URL")
                .unwrap_or(defaults.wordpress_base_url),
            license_verify_path: std::env::var("LICENSE_VERIFY_PATH")
                .unwrap_or(defaults.license_verify_path),
            license_timeout: Duration::from_secs(env_number("LICENSE_TIMEOUT_SECS", 10)),
            llm_timeout: Duration::from_secs(env_number("LLM_TIMEOUT_SECS", 60)),
            proxy_url: std::env::var("PROXY_URL").ok().filter(|s| !s.trim().is_empty()),
            admin_ids: parse_id_list(&std::env::var("ADMIN_IDS").unwrap_or_default()),
            cache_ttl: Duration::from_secs(env_number("CACHE_TTL", 3600)),
            cache_max_size: env_number("CACHE_MAX_SIZE", 1000),
            content_dir: std::env::var("CONTENT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.content_dir),
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty()),
            free_limit: env_number("FREE_LIMIT", 3),
        })
    }
}

/// Parse a comma-separated list of numeric ids, skipping anything unparsable.
pub fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',').filter_map(|s| s.trim().parse().ok()).collect()
}

fn env_number<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
