use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub sheets: SheetsConfig,
    pub client: ClientConfig,
    pub cache: CacheConfig,
}

/// Published-spreadsheet source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_spreadsheet_id")]
    pub spreadsheet_id: String,

    #[serde(default = "default_data_gid")]
    pub data_gid: String,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Snapshot cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://docs.google.com/spreadsheets/d".to_string()
}
fn default_spreadsheet_id() -> String {
    "1m3h9Xce3SRMaq20li2Qg4HuSZowwxQSd9FkQmeuI7Dw".to_string()
}
fn default_data_gid() -> String {
    "244946188".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_request_delay_ms() -> u64 {
    250
}
fn default_jitter_ms() -> u64 {
    100
}
fn default_max_retries() -> u32 {
    3
}
fn default_user_agent() -> String {
    "findash-engine/0.1 (quarterly disclosures dashboard)".to_string()
}
fn default_ttl_secs() -> u64 {
    300
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("FINDASH").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheets: SheetsConfig {
                base_url: default_base_url(),
                spreadsheet_id: default_spreadsheet_id(),
                data_gid: default_data_gid(),
            },
            client: ClientConfig {
                timeout_secs: default_timeout_secs(),
                request_delay_ms: default_request_delay_ms(),
                jitter_ms: default_jitter_ms(),
                max_retries: default_max_retries(),
                user_agent: default_user_agent(),
            },
            cache: CacheConfig {
                ttl_secs: default_ttl_secs(),
            },
        }
    }
}
