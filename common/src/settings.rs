use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgSslMode;
use std::fmt;
use std::path::PathBuf;

use crate::config;
use crate::err_context::ErrorContext;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    /// URL the API advertises to its clients, eg http://localhost:8081
    pub base_url: String,
    /// URL of the web frontend, used to build activation links.
    pub frontend_url: String,
    /// Origin allowed by the CORS layer.
    pub cors_origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
    pub connection_timeout: u64,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            // Try an encrypted connection, fallback
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database_name)
            .port(self.port)
            .ssl_mode(ssl_mode)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailClientSettings {
    /// URL of the Email Service the client connects to.
    pub server_url: String,
    pub sender_email: String,
    pub authorization_token: String,
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    pub secret: String,
    /// Lifetime of issued tokens, in minutes.
    pub token_expiration_minutes: i64,
    pub issuer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimiterSettings {
    pub enabled: bool,
    pub requests_per_frame: u64,
    pub frame_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JaegerSettings {
    pub endpoint: String,
    pub service_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingSettings {
    pub level: String,
    pub jaeger: Option<JaegerSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub email_client: EmailClientSettings,
    pub auth: AuthSettings,
    pub rate_limiter: RateLimiterSettings,
    pub cache: CacheSettings,
    pub tracing: TracingSettings,
    pub mode: String,
}

/// Settings used by the client binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL of the commune API, eg http://localhost:8081
    pub api_url: String,
    pub authorization_token: String,
    pub timeout: u64,
}

#[derive(Debug)]
pub enum Error {
    Configuration {
        context: String,
        source: config::Error,
    },
    Deserialization {
        context: String,
        source: ::config::ConfigError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration { context, source } => {
                write!(fmt, "Settings Configuration: {context} | {source}")
            }
            Error::Deserialization { context, source } => {
                write!(fmt, "Settings Deserialization: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<config::Error>> for Error {
    fn from(err: ErrorContext<config::Error>) -> Self {
        Error::Configuration {
            context: err.0,
            source: err.1,
        }
    }
}

fn workspace_config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("config")
}

fn database_settings_from_mode(mode: &str) -> Result<DatabaseSettings, Error> {
    let config_dir = workspace_config_dir();
    config::merge_configuration(config_dir.as_ref(), &["database"], mode, "COMMUNE", vec![])
        .map_err(|err| Error::Configuration {
            context: format!("Could not get database {mode} settings"),
            source: err,
        })?
        .get::<DatabaseSettings>("database")
        .map_err(|err| Error::Deserialization {
            context: format!("Invalid database {mode} settings"),
            source: err,
        })
}

/// Settings for the development database, as the application user.
pub async fn database_dev_settings() -> Result<DatabaseSettings, Error> {
    database_settings_from_mode("dev")
}

/// Settings for the development database, as the postgres superuser.
pub async fn database_root_settings() -> Result<DatabaseSettings, Error> {
    database_settings_from_mode("root")
}

/// Tracing settings suitable for development tooling: stdout only, no exporter.
pub fn tracing_dev_settings() -> TracingSettings {
    TracingSettings {
        level: "info".to_string(),
        jaeger: None,
    }
}
