use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::pricing::{EngineConfig, MissingDistancePolicy};

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

/// Top-level configuration for the pricing service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pricing: EngineConfig,
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

        let default_currency = env::var("PRICING_DEFAULT_CURRENCY")
            .map(|value| value.trim().to_ascii_uppercase())
            .unwrap_or_else(|_| "USD".to_string());
        if default_currency.is_empty() {
            return Err(ConfigError::InvalidCurrency);
        }

        let missing_distance = match env::var("PRICING_MISSING_DISTANCE") {
            Ok(raw) => parse_distance_policy(&raw)?,
            Err(_) => MissingDistancePolicy::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pricing: EngineConfig {
                default_currency,
                missing_distance,
            },
        })
    }
}

fn parse_distance_policy(raw: &str) -> Result<MissingDistancePolicy, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "reject" | "non-matching" => Ok(MissingDistancePolicy::Reject),
        "ignore" => Ok(MissingDistancePolicy::Ignore),
        other => Err(ConfigError::InvalidDistancePolicy(other.to_string())),
    }
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCurrency,
    InvalidDistancePolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCurrency => {
                write!(f, "PRICING_DEFAULT_CURRENCY must not be empty")
            }
            ConfigError::InvalidDistancePolicy(value) => write!(
                f,
                "PRICING_MISSING_DISTANCE must be 'reject' or 'ignore' (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCurrency
            | ConfigError::InvalidDistancePolicy(_) => None,
        }
    }
}
