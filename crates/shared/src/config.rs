//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session lifetime and cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Payment ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Log output configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
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
    /// Upper bound for a single request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
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

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// A session unused for this long is expired.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    /// A session never lives longer than this, regardless of activity.
    #[serde(default = "default_absolute_timeout")]
    pub absolute_timeout_secs: u64,
    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Whether the session cookie is marked `Secure`.
    #[serde(default = "default_secure_cookie")]
    pub secure_cookie: bool,
    /// How often the server sweeps expired sessions out of storage.
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

fn default_idle_timeout() -> u64 {
    1800 // 30 minutes
}

fn default_absolute_timeout() -> u64 {
    86400 // 24 hours
}

fn default_cookie_name() -> String {
    "scholaris_session".to_string()
}

fn default_secure_cookie() -> bool {
    true
}

fn default_purge_interval() -> u64 {
    600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            absolute_timeout_secs: default_absolute_timeout(),
            cookie_name: default_cookie_name(),
            secure_cookie: default_secure_cookie(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

/// Payment ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// IANA timezone that decides the calendar day printed on receipts.
    #[serde(default = "default_ledger_timezone")]
    pub timezone: String,
}

fn default_ledger_timezone() -> String {
    "Asia/Kolkata".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            timezone: default_ledger_timezone(),
        }
    }
}

impl LedgerConfig {
    /// Parses the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a known IANA timezone.
    pub fn tz(&self) -> Result<chrono_tz::Tz, config::ConfigError> {
        self.timezone.parse::<chrono_tz::Tz>().map_err(|_| {
            config::ConfigError::Message(format!("unknown ledger timezone: {}", self.timezone))
        })
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
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
            .add_source(config::Environment::with_prefix("SCHOLARIS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("SCHOLARIS__DATABASE__URL", Some("postgres://localhost/scholaris_test")),
                ("SCHOLARIS__SERVER__PORT", Some("9090")),
                ("SCHOLARIS__SESSION__IDLE_TIMEOUT_SECS", Some("60")),
                ("RUN_MODE", Some("config-test-does-not-exist")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/scholaris_test");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.session.idle_timeout_secs, 60);
                assert_eq!(config.session.absolute_timeout_secs, 86400);
                assert_eq!(config.ledger.timezone, "Asia/Kolkata");
                assert!(!config.logging.json);
            },
        );
    }

    #[test]
    fn test_session_defaults() {
        let session = SessionConfig::default();
        assert_eq!(session.idle_timeout_secs, 1800);
        assert_eq!(session.purge_interval_secs, 600);
        assert_eq!(session.cookie_name, "scholaris_session");
        assert!(session.secure_cookie);
    }

    #[test]
    fn test_ledger_timezone_parsing() {
        assert_eq!(LedgerConfig::default().tz().unwrap(), chrono_tz::Asia::Kolkata);

        let bad = LedgerConfig {
            timezone: "Mars/Olympus".to_string(),
        };
        assert!(bad.tz().is_err());
    }
}
