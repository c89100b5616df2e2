//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `zonealarm.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use zonealarm_domain::id::ZoneId;

/// Largest accepted UTC offset, in seconds.
const MAX_UTC_OFFSET_SECS: i32 = 86_399;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Wall-clock settings.
    pub clock: ClockConfig,
    /// Tick loop settings.
    pub scheduler: SchedulerConfig,
    /// Line-oriented console on stdin/stdout.
    pub console: ConsoleConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Local time offset, in seconds east of UTC.
    pub utc_offset_secs: i32,
    /// Start with the host time instead of waiting for `set` or `ntp`.
    pub trust_host_time: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Delay between two ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Zones that get a firing sink. Alarms in other zones never fire.
    pub zones: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Read JSON requests from stdin, one per line.
    pub enabled: bool,
}

impl Config {
    /// Load configuration from `zonealarm.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("zonealarm.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ZONEALARM_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("ZONEALARM_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("ZONEALARM_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("ZONEALARM_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("ZONEALARM_UTC_OFFSET") {
            if let Ok(secs) = val.parse() {
                self.clock.utc_offset_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("ZONEALARM_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.scheduler.tick_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "tick interval must be non-zero".to_string(),
            ));
        }
        if self.clock.utc_offset_secs.abs() > MAX_UTC_OFFSET_SECS {
            return Err(ConfigError::Validation(format!(
                "utc offset out of range: {}",
                self.clock.utc_offset_secs
            )));
        }
        if let Some(zone) = self
            .scheduler
            .zones
            .iter()
            .find(|zone| ZoneId::new(**zone).is_err())
        {
            return Err(ConfigError::Validation(format!(
                "zone out of range: {zone} (expected {}..={})",
                ZoneId::MIN,
                ZoneId::MAX
            )));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.scheduler.tick_interval_ms)
    }

    /// Configured zones, deduplicated, skipping any that are out of range.
    #[must_use]
    pub fn zone_ids(&self) -> Vec<ZoneId> {
        let mut zones: Vec<ZoneId> = self
            .scheduler
            .zones
            .iter()
            .filter_map(|zone| ZoneId::new(*zone).ok())
            .collect();
        zones.sort_unstable();
        zones.dedup();
        zones
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:zonealarm.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "zonealarmd=info,zonealarm=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_secs: 19_800,
            trust_host_time: true,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            zones: ZoneId::all().map(|zone| i64::from(zone.get())).collect(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
