// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted plugin state file parser
//!
//! The plugin keeps its connection settings in `~/.kube/rancher.json`, a flat
//! JSON object. Every field is optional; an empty file is a valid, empty
//! configuration. Command-line flags and `RANCHER_*` variables are layered
//! on top by the CLI.
//!
//! # Example
//!
//! ```no_run
//! use kubectl_rancher::config::RancherConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RancherConfig::load_from_path(RancherConfig::config_path()?)?;
//! if let Some(url) = &config.url {
//!     println!("Rancher server: {url}");
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::client::{ConnectionParameters, TrustPolicy};
use crate::error::{RancherError, Result};
use crate::resources::redacted;

/// Environment variable overriding the config file location
pub const ENV_RANCHER_CONFIG: &str = "RANCHER_CONFIG";
/// Environment variable naming the server URL
pub const ENV_RANCHER_URL: &str = "RANCHER_URL";

const CONFIG_FILE_NAME: &str = "rancher.json";

/// Contents of `rancher.json`
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RancherConfig {
    /// Rancher server URL (`http://` or `https://`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// `username:password` API token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Skip TLS verification
    pub insecure: bool,

    /// Path to a PEM CA bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca: Option<String>,

    /// Login user name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Login password; always written back empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// `local` or `ldap`
    #[serde(rename = "login-method", skip_serializing_if = "Option::is_none")]
    pub login_method: Option<String>,
}

impl std::fmt::Debug for RancherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RancherConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_deref().map(redacted))
            .field("insecure", &self.insecure)
            .field("ca", &self.ca)
            .field("user", &self.user)
            .field("password", &self.password.as_deref().map(redacted))
            .field("login_method", &self.login_method)
            .finish()
    }
}

impl RancherConfig {
    /// Load configuration from a specific path
    ///
    /// A missing or empty file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed JSON
    #[allow(clippy::result_large_err)]
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(RancherError::Config(format!(
                    "Failed to read config file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed
    #[allow(clippy::result_large_err)]
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
            .map_err(|e| RancherError::Config(format!("Failed to parse config JSON: {}", e)))
    }

    /// Write the configuration to `path`, clearing the password first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    #[allow(clippy::result_large_err)]
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut persisted = self.clone();
        persisted.password = Some(String::new());

        let json = serde_json::to_string_pretty(&persisted)
            .map_err(|e| RancherError::Config(format!("Failed to encode config: {}", e)))?;
        fs::write(path, json).map_err(|e| {
            RancherError::Config(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Get the default config file path (~/.kube/rancher.json)
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined
    #[allow(clippy::result_large_err)]
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            RancherError::Config("Could not determine home directory".to_string())
        })?;

        Ok(home.join(".kube").join(CONFIG_FILE_NAME))
    }

    /// Get the path to the config file, respecting RANCHER_CONFIG
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined when
    /// RANCHER_CONFIG is not set
    #[allow(clippy::result_large_err)]
    pub fn config_path() -> Result<PathBuf> {
        match std::env::var(ENV_RANCHER_CONFIG) {
            Ok(env_path) if !env_path.is_empty() => Ok(PathBuf::from(env_path)),
            _ => Self::default_path(),
        }
    }

    /// Create the config directory and an empty config file if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created
    #[allow(clippy::result_large_err)]
    pub fn bootstrap() -> Result<PathBuf> {
        let path = Self::config_path()?;
        Self::bootstrap_at(&path)?;
        Ok(path)
    }

    /// Create `path` (and its parent directory) if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created
    #[allow(clippy::result_large_err)]
    pub fn bootstrap_at(path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        if !path.exists() {
            fs::File::create(path)?;
            debug!(path = %path.display(), "Created empty config file");
        }
        Ok(())
    }

    /// The trust policy described by `insecure` and `ca`.
    #[must_use]
    pub fn trust_policy(&self) -> TrustPolicy {
        TrustPolicy {
            insecure: self.insecure,
            ca_path: self
                .ca
                .as_deref()
                .filter(|ca| !ca.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Connection parameters for API calls.
    ///
    /// # Errors
    ///
    /// Returns an error if no server URL is configured
    #[allow(clippy::result_large_err)]
    pub fn connection_parameters(&self) -> Result<ConnectionParameters> {
        let url = self.server_url()?;
        Ok(ConnectionParameters::builder(url)
            .trust(self.trust_policy())
            .token(self.token.clone().unwrap_or_default())
            .build())
    }

    /// The configured server URL.
    ///
    /// # Errors
    ///
    /// Returns an error if no server URL is configured
    #[allow(clippy::result_large_err)]
    pub fn server_url(&self) -> Result<&str> {
        self.url.as_deref().filter(|u| !u.is_empty()).ok_or_else(|| {
            RancherError::Config(format!(
                "No Rancher server url configured; pass --url or set {ENV_RANCHER_URL}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"{
  "url": "https://rancher.example.com",
  "token": "token-abc12:xyz",
  "insecure": false,
  "ca": "/etc/rancher/ca.pem",
  "login-method": "local"
}"#;

    #[test]
    fn test_parse_basic_config() {
        let config = RancherConfig::from_json(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.url.as_deref(), Some("https://rancher.example.com"));
        assert_eq!(config.token.as_deref(), Some("token-abc12:xyz"));
        assert!(!config.insecure);
        assert_eq!(config.login_method.as_deref(), Some("local"));
        assert!(config.user.is_none());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(RancherConfig::from_json("").unwrap(), RancherConfig::default());
        assert_eq!(
            RancherConfig::from_json("  \n").unwrap(),
            RancherConfig::default()
        );
        assert_eq!(RancherConfig::from_json("{}").unwrap(), RancherConfig::default());
    }

    #[test]
    fn test_malformed_config() {
        let err = RancherConfig::from_json("{\"url\": ").unwrap_err();
        assert!(matches!(err, RancherError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        let config = RancherConfig::load_from_path(tmp.path().join("rancher.json")).unwrap();
        assert_eq!(config, RancherConfig::default());
    }

    #[test]
    fn test_save_clears_password() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rancher.json");

        let mut config = RancherConfig::from_json(SAMPLE_CONFIG).unwrap();
        config.password = Some("s3cret".to_string());
        config.token = Some("token-new:abc".to_string());
        config.save_to_path(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("s3cret"));

        let reloaded = RancherConfig::load_from_path(&path).unwrap();
        assert_eq!(reloaded.token.as_deref(), Some("token-new:abc"));
        assert_eq!(reloaded.password.as_deref(), Some(""));
        assert_eq!(reloaded.url, config.url);
    }

    #[test]
    fn test_bootstrap_creates_dir_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".kube").join("rancher.json");

        RancherConfig::bootstrap_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        // existing content survives a second bootstrap
        fs::write(&path, SAMPLE_CONFIG).unwrap();
        RancherConfig::bootstrap_at(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE_CONFIG);
    }

    #[test]
    fn test_connection_parameters() {
        let config = RancherConfig::from_json(SAMPLE_CONFIG).unwrap();
        let params = config.connection_parameters().unwrap();

        assert_eq!(params.base_url, "https://rancher.example.com");
        assert_eq!(params.token, "token-abc12:xyz");
        assert_eq!(
            params.trust.ca_path,
            Some(PathBuf::from("/etc/rancher/ca.pem"))
        );
        assert!(!params.trust.insecure);
    }

    #[test]
    fn test_missing_url() {
        let err = RancherConfig::default()
            .connection_parameters()
            .unwrap_err();
        assert!(matches!(err, RancherError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = RancherConfig::from_json(SAMPLE_CONFIG).unwrap();
        config.password = Some("s3cret".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("xyz"));
        assert!(!rendered.contains("s3cret"));
    }
}
