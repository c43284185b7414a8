use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Deployment stage the ledger service runs in.
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

/// Settings shared by the HTTP service and the batch commands.
///
/// Values come from the process environment, with a `.env` file in the
/// working directory filling in anything unset.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub merchants: MerchantConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&env_or("APP_ENV", "development"));

        let server = ServerConfig {
            host: env_or("APP_HOST", DEFAULT_HOST),
            port: match non_blank("APP_PORT") {
                Some(raw) => raw
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort { value: raw })?,
                None => DEFAULT_PORT,
            },
        };

        Ok(Self {
            environment,
            server,
            telemetry: TelemetryConfig {
                log_level: env_or("APP_LOG_LEVEL", DEFAULT_LOG_LEVEL),
            },
            merchants: MerchantConfig {
                rules_path: non_blank("MERCHANT_RULES_PATH").map(PathBuf::from),
            },
        })
    }
}

/// Trimmed value of `key`, or `None` when unset or blank.
fn non_blank(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    non_blank(key).unwrap_or_else(|| default.to_string())
}

/// Listen address for the normalization API.
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

        let ip: IpAddr = self.host.parse().map_err(|source| ConfigError::InvalidHost {
            value: self.host.clone(),
            source,
        })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

/// Where merchant rule overrides come from, if anywhere.
#[derive(Debug, Clone, Default)]
pub struct MerchantConfig {
    pub rules_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
    },
    InvalidHost {
        value: String,
        source: std::net::AddrParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { value } => {
                write!(f, "APP_PORT must be a port number between 0 and 65535, got '{value}'")
            }
            ConfigError::InvalidHost { value, .. } => {
                write!(f, "APP_HOST must be an IP address or 'localhost', got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort { .. } => None,
            ConfigError::InvalidHost { source, .. } => Some(source),
        }
    }
}
