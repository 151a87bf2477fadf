use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::lending::eligibility::PolicyConfig;

const DEFAULT_LIMIT_SALARY_MULTIPLIER: u32 = 36;
const DEFAULT_MAX_INSTALLMENT_RATIO: f64 = 0.5;

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

/// Top-level configuration for the lending service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub lending: LendingConfig,
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
        let include_targets = environment != AppEnvironment::Production;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                include_targets,
            },
            lending: LendingConfig::from_env()?,
        })
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub include_targets: bool,
}

/// Registry and policy dials for the lending workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct LendingConfig {
    /// Approved limit granted at registration, as a multiple of monthly salary.
    pub limit_salary_multiplier: u32,
    /// Debt-to-income ceiling applied after the installment is computed.
    pub max_installment_ratio: f64,
    pub seed_customers: Option<PathBuf>,
    pub seed_loans: Option<PathBuf>,
}

impl LendingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let limit_salary_multiplier = match env::var("CREDIT_LIMIT_SALARY_MULTIPLIER") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidNumber {
                    variable: "CREDIT_LIMIT_SALARY_MULTIPLIER",
                    value: raw,
                })?,
            Err(_) => DEFAULT_LIMIT_SALARY_MULTIPLIER,
        };

        let max_installment_ratio = match env::var("CREDIT_MAX_INSTALLMENT_RATIO") {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite() && *value > 0.0)
                .ok_or(ConfigError::InvalidNumber {
                    variable: "CREDIT_MAX_INSTALLMENT_RATIO",
                    value: raw,
                })?,
            Err(_) => DEFAULT_MAX_INSTALLMENT_RATIO,
        };

        Ok(Self {
            limit_salary_multiplier,
            max_installment_ratio,
            seed_customers: env::var_os("CREDIT_SEED_CUSTOMERS").map(PathBuf::from),
            seed_loans: env::var_os("CREDIT_SEED_LOANS").map(PathBuf::from),
        })
    }

    /// Scoring policy with the configured affordability ceiling applied.
    pub fn policy(&self) -> PolicyConfig {
        PolicyConfig {
            max_installment_to_salary: self.max_installment_ratio,
            ..PolicyConfig::default()
        }
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            limit_salary_multiplier: DEFAULT_LIMIT_SALARY_MULTIPLIER,
            max_installment_ratio: DEFAULT_MAX_INSTALLMENT_RATIO,
            seed_customers: None,
            seed_loans: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable, value } => {
                write!(f, "{variable} must be a positive number (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "CREDIT_LIMIT_SALARY_MULTIPLIER",
            "CREDIT_MAX_INSTALLMENT_RATIO",
            "CREDIT_SEED_CUSTOMERS",
            "CREDIT_SEED_LOANS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.lending, LendingConfig::default());
        assert_eq!(config.lending.policy(), PolicyConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn lending_overrides_flow_into_policy() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CREDIT_LIMIT_SALARY_MULTIPLIER", "24");
        env::set_var("CREDIT_MAX_INSTALLMENT_RATIO", "0.4");
        env::set_var("CREDIT_SEED_LOANS", "data/loans.csv");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.lending.limit_salary_multiplier, 24);
        assert_eq!(config.lending.policy().max_installment_to_salary, 0.4);
        assert_eq!(
            config.lending.seed_loans,
            Some(PathBuf::from("data/loans.csv"))
        );
        reset_env();
    }

    #[test]
    fn rejects_non_positive_installment_ratio() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CREDIT_MAX_INSTALLMENT_RATIO", "-1");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber { variable, .. }) => {
                assert_eq!(variable, "CREDIT_MAX_INSTALLMENT_RATIO")
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
        reset_env();
    }
}
