pub mod credentials;

use actix_web::http::Uri;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use credentials::ServiceAccount;

pub const DEFAULT_CONFIG_PATH: &str = "server/config/server.toml";
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl StoreBackend {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid(format!(
                "unknown store backend '{other}' (expected 'mongo' or 'memory')"
            ))),
        }
    }
}

/// Optional TOML file. Every key can be overridden from the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerSection,
    pub cors: CorsSection,
    pub database: DatabaseSection,
    pub auth: AuthSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsSection {
    pub frontend_origin: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub backend: Option<String>,
    pub uri: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub service_account_path: Option<PathBuf>,
    pub identity_endpoint: Option<String>,
}

impl FileConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Public web-client settings served from `/firebase-config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    pub measurement_id: String,
}

impl ClientConfig {
    /// Unset variables become empty strings.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).unwrap_or_default();
        Self {
            api_key: var("F_API_KEY"),
            auth_domain: var("F_AUTH_DOMAIN"),
            project_id: var("F_PROJECT_ID"),
            storage_bucket: var("F_STORAGE_BUCKET"),
            messaging_sender_id: var("F_MSG_ID"),
            app_id: var("F_APP_ID"),
            measurement_id: var("F_MEASURE_ID"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` allows any origin.
    pub frontend_origin: Option<String>,
    pub store_backend: StoreBackend,
    pub mongodb_uri: String,
    pub database_name: String,
    pub service_account_path: PathBuf,
    pub identity_endpoint: String,
    pub client: ClientConfig,
}

impl ServerConfig {
    /// Reads the optional TOML file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit_path = env_var("CONFIG_PATH");
        let config_path = explicit_path
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let file = match FileConfig::load_from_file(&config_path) {
            Ok(file) => {
                log::info!("Loaded configuration file {}", config_path);
                file
            }
            Err(ConfigError::Read { .. }) if explicit_path.is_none() => FileConfig::default(),
            Err(e) => return Err(e),
        };

        Self::from_sources(file, env_var)
    }

    /// Layers `lookup` (the environment) over `file`, then over built-in defaults.
    pub fn from_sources(
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("PORT must be a port number, got '{raw}'"))
            })?,
            None => file.server.port.unwrap_or(5000),
        };

        let store_backend = match lookup("STORE_BACKEND").or(file.database.backend) {
            Some(raw) => StoreBackend::parse(&raw)?,
            None => StoreBackend::Mongo,
        };

        let frontend_origin = match lookup("FRONTEND_ORIGIN").or(file.cors.frontend_origin) {
            Some(origin) if origin.trim() == "*" => None,
            Some(origin) => Some(validate_origin(origin.trim())?),
            None => None,
        };

        Ok(Self {
            host: lookup("SERVER_HOST")
                .or(file.server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            frontend_origin,
            store_backend,
            mongodb_uri: lookup("MONGODB_URI")
                .or(file.database.uri)
                .unwrap_or_else(|| "mongodb://localhost:27017".to_string()),
            database_name: lookup("DATABASE_NAME")
                .or(file.database.name)
                .unwrap_or_else(|| "studyhub".to_string()),
            service_account_path: lookup("FIREBASE_SERVICE_ACCOUNT_JSON")
                .map(PathBuf::from)
                .or(file.auth.service_account_path)
                .unwrap_or_else(|| PathBuf::from("serviceAccountKey.json")),
            identity_endpoint: lookup("IDENTITY_ENDPOINT")
                .or(file.auth.identity_endpoint)
                .unwrap_or_else(|| DEFAULT_IDENTITY_ENDPOINT.to_string()),
            client: ClientConfig::from_lookup(&lookup),
        })
    }
}

/// A CORS origin is `scheme://host[:port]`.
fn validate_origin(origin: &str) -> Result<String, ConfigError> {
    let uri: Uri = origin.parse().map_err(|_| {
        ConfigError::Invalid(format!("FRONTEND_ORIGIN is not a valid URI: '{origin}'"))
    })?;

    if uri.scheme().is_none() || uri.host().is_none() {
        return Err(ConfigError::Invalid(format!(
            "FRONTEND_ORIGIN must include a scheme and host, got '{origin}'"
        )));
    }

    Ok(origin.trim_end_matches('/').to_string())
}

/// Empty values count as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
