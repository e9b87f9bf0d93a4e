//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Planning calendar and listing configuration.
    #[serde(default)]
    pub planning: PlanningConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration as read from config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Planning calendar and list settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PlanningConfig {
    /// First year offered for planning.
    #[serde(default = "default_first_year")]
    pub first_year: i32,
    /// How many years past the current year may be planned.
    #[serde(default = "default_horizon_years")]
    pub horizon_years: i32,
    /// Page size used when a list request does not ask for one.
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
    /// Upper bound for a requested page size.
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
}

fn default_first_year() -> i32 {
    2021
}

fn default_horizon_years() -> i32 {
    5
}

fn default_per_page() -> u32 {
    50
}

fn default_max_per_page() -> u32 {
    200
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            first_year: default_first_year(),
            horizon_years: default_horizon_years(),
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PLANBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
