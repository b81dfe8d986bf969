//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Page size used by list endpoints when the request does not name one.
    #[serde(default = "default_list_limit")]
    pub default_list_limit: u32,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_upload_bytes() -> u64 {
    crate::DEFAULT_MAX_UPLOAD_BYTES
}

fn default_list_limit() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
            default_list_limit: default_list_limit(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upload_bytes == 0 {
            return Err("server.max_upload_bytes must be greater than 0".to_string());
        }
        if self.default_list_limit == 0 {
            return Err("server.default_list_limit must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
        /// Query timeout in seconds (advisory only - SQLite cannot force-cancel queries).
        #[serde(default = "default_sqlite_query_timeout_secs")]
        query_timeout_secs: Option<u64>,
    },
}

fn default_sqlite_query_timeout_secs() -> Option<u64> {
    Some(600) // 10 minutes (advisory only)
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/leaflet.db"),
            query_timeout_secs: default_sqlite_query_timeout_secs(),
        }
    }
}

impl MetadataConfig {
    /// Validate metadata configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MetadataConfig::Sqlite { path, .. } if path.as_os_str().is_empty() => {
                Err("metadata.path must not be empty".to_string())
            }
            MetadataConfig::Sqlite { .. } => Ok(()),
        }
    }
}

/// Identity configuration.
///
/// Leaflet trusts an authenticating reverse proxy to report the caller's
/// external identity in two request headers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header carrying the identity provider name.
    #[serde(default = "default_provider_header")]
    pub provider_header: String,
    /// Header carrying the subject id at that provider.
    #[serde(default = "default_subject_header")]
    pub subject_header: String,
    /// Administrators, as `provider:subject` strings.
    #[serde(default)]
    pub admins: Vec<String>,
    /// Login URL; `{return}` is replaced with the percent-encoded return path.
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// Logout URL; `{return}` is replaced with the percent-encoded return path.
    #[serde(default = "default_logout_url")]
    pub logout_url: String,
}

fn default_provider_header() -> String {
    "x-leaflet-provider".to_string()
}

fn default_subject_header() -> String {
    "x-leaflet-subject".to_string()
}

fn default_login_url() -> String {
    "/auth/login?return={return}".to_string()
}

fn default_logout_url() -> String {
    "/auth/logout?return={return}".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider_header: default_provider_header(),
            subject_header: default_subject_header(),
            admins: Vec::new(),
            login_url: default_login_url(),
            logout_url: default_logout_url(),
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.provider_header.trim().is_empty() || self.subject_header.trim().is_empty() {
            return Err("auth.provider_header and auth.subject_header must be set".to_string());
        }
        if let Some(bad) = self.admins.iter().find(|a| !a.contains(':')) {
            return Err(format!(
                "auth.admins entry '{bad}' must have the form provider:subject"
            ));
        }
        Ok(())
    }

    /// Configuration for tests: `test:admin` is an administrator.
    pub fn for_testing() -> Self {
        Self {
            admins: vec!["test:admin".to_string()],
            ..Default::default()
        }
    }
}

/// Blob service configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Base URL of the blob service that receives uploads and serves images.
    #[serde(default = "default_blob_base_url")]
    pub base_url: String,
}

fn default_blob_base_url() -> String {
    "http://127.0.0.1:9000/".to_string()
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            base_url: default_blob_base_url(),
        }
    }
}

impl UploadsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "uploads.base_url '{}' must be an http(s) URL",
                self.base_url
            ));
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
}

impl AppConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.metadata.validate()?;
        self.auth.validate()?;
        self.uploads.validate()?;
        Ok(())
    }

    /// Configuration for tests. The metadata path should be replaced with a
    /// temporary location.
    pub fn for_testing() -> Self {
        Self {
            auth: AuthConfig::for_testing(),
            ..Default::default()
        }
    }
}
