use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub aviationstack: AviationstackConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct AviationstackConfig {
    /// No key means the external tier is skipped and search serves
    /// straight from the catalog/sample fallback.
    pub api_key: Option<String>,
    #[serde(default = "default_aviationstack_url")]
    pub base_url: String,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_seconds: u64,
}

fn default_aviationstack_url() -> String {
    "https://api.aviationstack.com/v1".to_string()
}

fn default_lookup_timeout() -> u64 {
    12
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific file, optional.
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in.
            .add_source(config::File::with_name("config/local").required(false))
            // E.g. `SKYBOOK__SERVER__PORT=8080`.
            .add_source(config::Environment::with_prefix("SKYBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
