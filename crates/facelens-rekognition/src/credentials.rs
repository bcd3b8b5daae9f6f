//! How the Rekognition client finds its credentials.
//!
//! Either the default AWS provider chain (environment, profile, instance
//! role, ...) or an explicit key pair kept in a TOML secrets file:
//!
//! ```toml
//! [aws]
//! access_key_id = "AKIA..."
//! secret_access_key = "..."
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "ap-northeast-2";

#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("failed to read secrets file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid secrets file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("secrets file has an empty `{0}`")]
    Empty(&'static str),
}

/// Top-level secrets file structure.
#[derive(Deserialize)]
struct SecretsFile {
    aws: AwsSecrets,
}

#[derive(Deserialize)]
struct AwsSecrets {
    access_key_id: String,
    secret_access_key: String,
    /// Overrides the configured region when present.
    region: Option<String>,
}

/// Where credentials come from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Default provider chain.
    Ambient,
    /// Fixed key pair.
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
}

// Never print the secret key.
impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Ambient => f.write_str("Ambient"),
            CredentialSource::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .finish_non_exhaustive(),
        }
    }
}

/// Everything needed to build a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub region: String,
    pub credentials: CredentialSource,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            credentials: CredentialSource::Ambient,
        }
    }
}

impl ClientSettings {
    /// Build settings from a region and an optional secrets file.
    ///
    /// Without a secrets file the ambient provider chain is used.
    pub fn resolve(region: Option<String>, secrets_path: Option<&Path>) -> Result<Self, SecretsError> {
        let mut settings = Self {
            region: region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            credentials: CredentialSource::Ambient,
        };
        if let Some(path) = secrets_path {
            let src = std::fs::read_to_string(path).map_err(|source| SecretsError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            settings.apply_secrets(&src)?;
            tracing::info!(path = %path.display(), "using credentials from secrets file");
        }
        Ok(settings)
    }

    /// Load `FACELENS_REGION` and `FACELENS_SECRETS_PATH`.
    pub fn from_env() -> Result<Self, SecretsError> {
        let region = std::env::var("FACELENS_REGION").ok();
        let secrets = std::env::var("FACELENS_SECRETS_PATH").ok().map(PathBuf::from);
        Self::resolve(region, secrets.as_deref())
    }

    fn apply_secrets(&mut self, src: &str) -> Result<(), SecretsError> {
        let file: SecretsFile = toml::from_str(src)?;
        let aws = file.aws;
        if aws.access_key_id.trim().is_empty() {
            return Err(SecretsError::Empty("access_key_id"));
        }
        if aws.secret_access_key.trim().is_empty() {
            return Err(SecretsError::Empty("secret_access_key"));
        }
        if let Some(region) = aws.region {
            self.region = region;
        }
        self.credentials = CredentialSource::Static {
            access_key_id: aws.access_key_id,
            secret_access_key: aws.secret_access_key,
        };
        Ok(())
    }
}
