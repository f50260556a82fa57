// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed wrappers for kubeconfig generation.
//!
//! The `generateKubeconfig` cluster action answers with a JSON object whose
//! `config` field holds the kubeconfig YAML. Documents are written to
//! `~/.kube/<cluster name>.yaml`.

use crate::error::{RancherError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Deserialize)]
struct GenerateKubeconfigOutput {
    config: String,
}

/// Kubeconfig YAML returned for one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeconfigDocument {
    /// The complete kubeconfig YAML content.
    pub raw_yaml: String,
}

impl KubeconfigDocument {
    /// Create a document from YAML text.
    #[must_use]
    pub fn new(raw_yaml: impl Into<String>) -> Self {
        Self {
            raw_yaml: raw_yaml.into(),
        }
    }

    /// Decode a `generateKubeconfig` response body.
    ///
    /// # Errors
    ///
    /// - [`RancherError::EmptyResult`] if the body or the `config` field is empty
    /// - [`RancherError::Decode`] if the body is not the expected JSON shape
    #[allow(clippy::result_large_err)]
    pub fn from_json(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Err(RancherError::EmptyResult(
                "Kubeconfig file looks empty".to_string(),
            ));
        }
        let output: GenerateKubeconfigOutput = serde_json::from_slice(body)?;
        if output.config.is_empty() {
            return Err(RancherError::EmptyResult(
                "Kubeconfig file looks empty".to_string(),
            ));
        }
        Ok(Self::new(output.config))
    }

    /// Check if the kubeconfig data is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw_yaml.is_empty()
    }

    /// Get the length of the kubeconfig data in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw_yaml.len()
    }

    /// Write the kubeconfig as `<dir>/<cluster_name>.yaml`, creating `dir`
    /// if needed. An existing file is overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster name is not a plain file name or the
    /// directory/file cannot be written.
    #[allow(clippy::result_large_err)]
    pub fn write_to_dir(&self, dir: impl AsRef<Path>, cluster_name: &str) -> Result<PathBuf> {
        let path = Self::output_path(dir, cluster_name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, self.raw_yaml.as_bytes())?;
        Ok(path)
    }

    /// Location a cluster's kubeconfig is written to inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RancherError::Validation`] unless `cluster_name` is a single
    /// normal path component.
    #[allow(clippy::result_large_err)]
    pub fn output_path(dir: impl AsRef<Path>, cluster_name: &str) -> Result<PathBuf> {
        validate_file_name(cluster_name)?;
        Ok(dir.as_ref().join(format!("{cluster_name}.yaml")))
    }

    /// The default output directory (`~/.kube`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined
    #[allow(clippy::result_large_err)]
    pub fn default_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            RancherError::Config("Could not determine home directory".to_string())
        })?;
        Ok(home.join(".kube"))
    }
}

#[allow(clippy::result_large_err)]
fn validate_file_name(cluster_name: &str) -> Result<()> {
    let mut components = Path::new(cluster_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == cluster_name => Ok(()),
        _ => Err(RancherError::Validation(format!(
            "cluster name {cluster_name:?} cannot be used as a file name"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let doc =
            KubeconfigDocument::from_json(br#"{"config":"apiVersion: v1\nkind: Config"}"#).unwrap();
        assert_eq!(doc.raw_yaml, "apiVersion: v1\nkind: Config");
        assert_eq!(doc.len(), 27);
    }

    #[test]
    fn test_empty_body() {
        let err = KubeconfigDocument::from_json(b"").unwrap_err();
        assert!(matches!(err, RancherError::EmptyResult(_)));
    }

    #[test]
    fn test_empty_config_field() {
        let err = KubeconfigDocument::from_json(br#"{"config":""}"#).unwrap_err();
        assert!(matches!(err, RancherError::EmptyResult(_)));
    }

    #[test]
    fn test_missing_config_field() {
        let err = KubeconfigDocument::from_json(br#"{"type":"generateKubeConfigOutput"}"#)
            .unwrap_err();
        assert!(matches!(err, RancherError::Decode(_)));
    }

    #[test]
    fn test_non_string_config_field() {
        let err = KubeconfigDocument::from_json(br#"{"config":42}"#).unwrap_err();
        assert!(matches!(err, RancherError::Decode(_)));
    }

    #[test]
    fn test_write_creates_dir_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".kube");

        let first = KubeconfigDocument::new("first");
        let path = first.write_to_dir(&dir, "prod").unwrap();
        assert_eq!(path, dir.join("prod.yaml"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");

        let second = KubeconfigDocument::new("second");
        second.write_to_dir(&dir, "prod").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_output_path_rejects_traversal() {
        for name in ["", ".", "..", "../prod", "a/b", "/etc/passwd"] {
            let err = KubeconfigDocument::output_path("/tmp", name).unwrap_err();
            assert!(matches!(err, RancherError::Validation(_)), "{name}");
        }
        assert!(KubeconfigDocument::output_path("/tmp", "my-cluster.prod").is_ok());
    }
}
