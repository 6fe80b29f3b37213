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
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Invoice document configuration.
    #[serde(default)]
    pub invoice: InvoiceConfig,
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

/// JWT settings as read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

/// Issuer details printed on generated invoices.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceConfig {
    /// Legal name of the issuing agency.
    #[serde(default = "default_issuer_name")]
    pub issuer_name: String,
    /// Postal address printed under the issuer name.
    #[serde(default)]
    pub issuer_address: Option<String>,
    /// Footer line printed at the bottom of each page.
    #[serde(default)]
    pub footer: Option<String>,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            issuer_name: default_issuer_name(),
            issuer_address: None,
            footer: None,
        }
    }
}

fn default_issuer_name() -> String {
    "Itinera Travel".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `ITINERA__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("ITINERA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Returns the `host:port` address to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("ITINERA__SERVER__HOST", Some("127.0.0.1")),
                ("ITINERA__SERVER__PORT", Some("9090")),
                ("ITINERA__DATABASE__URL", Some("postgres://localhost/itinera_test")),
                ("ITINERA__JWT__SECRET", Some("test-secret")),
                ("ITINERA__INVOICE__ISSUER_NAME", Some("Andes Tours")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.server.host, "127.0.0.1");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.database.url, "postgres://localhost/itinera_test");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.jwt.secret, "test-secret");
                assert_eq!(config.jwt.access_token_expiry_secs, 900);
                assert_eq!(config.invoice.issuer_name, "Andes Tours");
                assert!(!config.logging.json);
                assert_eq!(config.bind_address(), "127.0.0.1:9090");
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("ITINERA__DATABASE__URL", None::<&str>),
                ("ITINERA__JWT__SECRET", Some("test-secret")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_invoice_defaults() {
        let invoice = InvoiceConfig::default();
        assert_eq!(invoice.issuer_name, "Itinera Travel");
        assert!(invoice.issuer_address.is_none());
    }
}
