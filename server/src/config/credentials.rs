use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::ConfigError;

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// The parts of a service-account key file this backend needs. The private
/// key is never read.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    #[serde(rename = "type")]
    pub account_type: String,
    pub project_id: String,
    pub client_email: String,
}

impl ServiceAccount {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let account = Self::from_json(&content).map_err(|e| match e {
            ConfigError::Invalid(message) => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        log::info!(
            "Loaded service account {} for project {}",
            account.client_email,
            account.project_id
        );
        Ok(account)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let account: ServiceAccount = serde_json::from_str(content)
            .map_err(|e| ConfigError::Invalid(format!("service account JSON: {e}")))?;

        if account.account_type != SERVICE_ACCOUNT_TYPE {
            return Err(ConfigError::Invalid(format!(
                "expected credential type '{SERVICE_ACCOUNT_TYPE}', got '{}'",
                account.account_type
            )));
        }

        if account.project_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "service account has an empty project_id".to_string(),
            ));
        }

        Ok(account)
    }
}
