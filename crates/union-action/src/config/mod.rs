use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::chatops::message::MessageLimits;
use crate::intake::ComplaintContext;

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

    pub fn label(&self) -> &'static str {
        match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Test => "test",
            AppEnvironment::Production => "production",
        }
    }
}

/// Top-level configuration for the bridge and its bundled backend.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    /// Binding for the chat-ops agent (webhook receiver).
    pub server: ServerConfig,
    /// Binding for the union action backend.
    pub backend: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub bridge: BridgeConfig,
    pub survey: SurveyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&env_or("APP_ENV", "development"));

        let server = ServerConfig {
            host: env_or("APP_HOST", "127.0.0.1"),
            port: parse_env("APP_PORT", 8080)?,
        };
        let backend = ServerConfig {
            host: env_or("UNION_ACTION_HOST", "127.0.0.1"),
            port: parse_env("UNION_ACTION_PORT", 8000)?,
        };

        let default_format = if environment == AppEnvironment::Production {
            "json"
        } else {
            "text"
        };
        let telemetry = TelemetryConfig {
            log_level: env_or("APP_LOG_LEVEL", "info"),
            format: LogFormat::parse(&env_or("APP_LOG_FORMAT", default_format))?,
        };

        let defaults = ComplaintContext::default();
        let bridge = BridgeConfig {
            union_action_url: env_or("UNION_ACTION_API_URL", "http://localhost:8000"),
            request_timeout: Duration::from_secs(parse_env("UNION_ACTION_TIMEOUT", 30)?),
            limits: MessageLimits {
                max_narrative_chars: parse_env("MAX_NARRATIVE_LENGTH", 2000)?,
                max_maxim_chars: parse_env("MAX_MAXIM_LENGTH", 500)?,
            },
            complaint_context: ComplaintContext {
                pressures: env_or("COMPLAINT_PRESSURES", &defaults.pressures),
                duties: env_or("COMPLAINT_DUTIES", &defaults.duties),
                actor_role: env_or("COMPLAINT_ROLE", &defaults.actor_role),
                experience: env_or("COMPLAINT_EXPERIENCE", &defaults.experience),
            },
            health_cache_ttl: Duration::from_secs(parse_env("HEALTH_CACHE_TTL", 10)?),
        };

        let survey = SurveyConfig {
            api_token: env::var("TYPEFORM_API_TOKEN")
                .ok()
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
                .map(SecretString::new),
            api_base: env_or("TYPEFORM_API_BASE", "https://api.typeform.com"),
            share_host: env_or("SURVEY_SHARE_HOST", "typeform.com"),
            scale_type: env_or("SURVEY_SCALE", "0-4"),
            deployment_mode: env_or("SURVEY_MODE", "employee_self"),
            deploy_timeout: Duration::from_secs(parse_env("SURVEY_DEPLOY_TIMEOUT", 20)?),
        };

        Ok(Self {
            environment,
            server,
            backend,
            telemetry,
            bridge,
            survey,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling an HTTP server binding.
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

/// Output encoding for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "compact" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(raw.to_string())),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Settings for the chat-ops side: where the backend lives and how inbound
/// messages are shaped into complaint documents.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub union_action_url: String,
    pub request_timeout: Duration,
    pub limits: MessageLimits,
    pub complaint_context: ComplaintContext,
    pub health_cache_ttl: Duration,
}

/// Survey deployment settings. A configured token switches the backend to the
/// live forms API.
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    pub api_token: Option<SecretString>,
    pub api_base: String,
    pub share_host: String,
    pub scale_type: String,
    pub deployment_mode: String,
    pub deploy_timeout: Duration,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            api_base: "https://api.typeform.com".to_string(),
            share_host: "typeform.com".to_string(),
            scale_type: "0-4".to_string(),
            deployment_mode: "employee_self".to_string(),
            deploy_timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str },
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a valid non-negative number")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "host must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'json' or 'text', got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidNumber { .. } | ConfigError::InvalidLogFormat(_) => None,
        }
    }
}
