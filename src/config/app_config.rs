use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub vendors: VendorDefaults,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Authentication and credential-protection secrets
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret used to sign API tokens
    pub secret_key: String,
    /// Master secret protecting vendor credentials at rest. Rotating it
    /// invalidates every stored credential.
    pub encryption_key: String,
    /// Content hashes of pre-issued tokens accepted by a standalone
    /// gateway (see the `issue-token` command)
    pub seed_token_hashes: Vec<String>,
}

/// Defaults applied to vendor upstream calls
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VendorDefaults {
    /// Timeout for buffered completion calls and catalog fetches (seconds)
    pub timeout_secs: u64,
    /// Timeout for streaming completion calls (seconds)
    pub stream_timeout_secs: u64,
    /// Total outbound attempts for transient failures, including the first
    pub max_attempts: u32,
    /// TTL of each vendor's cached model catalog (seconds)
    pub models_cache_ttl_secs: u64,
    /// Optional JSON file seeding the vendor directory of a standalone
    /// gateway
    pub config_file: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: "change-me-in-production".to_string(),
            encryption_key: "change-me-in-production".to_string(),
            seed_token_hashes: Vec::new(),
        }
    }
}

impl Default for VendorDefaults {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            stream_timeout_secs: 600,
            max_attempts: 2,
            models_cache_ttl_secs: 3600,
            config_file: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.vendors.timeout_secs, 60);
        assert_eq!(config.vendors.models_cache_ttl_secs, 3600);
        assert!(config.vendors.stream_timeout_secs > config.vendors.timeout_secs);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.vendors.max_attempts, 2);
    }
}
