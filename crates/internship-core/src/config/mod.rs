use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::internship::{InternshipConfig, LegacyCategoryPolicy};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub program: InternshipConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            program: load_program_config()?,
        })
    }
}

fn load_program_config() -> Result<InternshipConfig, ConfigError> {
    let defaults = InternshipConfig::default();

    let legacy_category = match env::var("INTERNSHIP_LEGACY_CATEGORY") {
        Ok(raw) => LegacyCategoryPolicy::parse(&raw)
            .ok_or(ConfigError::InvalidLegacyCategoryPolicy { value: raw })?,
        Err(_) => defaults.legacy_category,
    };

    let max_marks = match env::var("INTERNSHIP_MAX_MARKS") {
        Ok(raw) => match raw.trim().parse::<u16>() {
            Ok(value) if value > 0 => value,
            _ => return Err(ConfigError::InvalidMaxMarks),
        },
        Err(_) => defaults.max_marks,
    };

    Ok(InternshipConfig {
        legacy_category,
        max_marks,
    })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLegacyCategoryPolicy { value: String },
    InvalidMaxMarks,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLegacyCategoryPolicy { value } => write!(
                f,
                "INTERNSHIP_LEGACY_CATEGORY must be 'self_found' or 'require_categorization' (found '{value}')"
            ),
            ConfigError::InvalidMaxMarks => {
                write!(f, "INTERNSHIP_MAX_MARKS must be a positive u16")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLegacyCategoryPolicy { .. }
            | ConfigError::InvalidMaxMarks => None,
        }
    }
}
