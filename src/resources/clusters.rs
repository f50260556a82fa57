// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed wrappers for the cluster listing endpoint.
//!
//! Rancher has shipped two shapes for a cluster entry: older servers expose
//! the display name as a top-level `name`, newer ones nest it under
//! `appliedSpec.displayName`. Entries are decoded permissively and the
//! display name is probed from whichever field is populated.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Identifier of the management cluster itself.
pub const LOCAL_CLUSTER: &str = "local";

/// Mapping from cluster display name to cluster id.
pub type ClusterMap = BTreeMap<String, String>;

/// One cluster as reported by `GET /v3/clusters`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSummary {
    /// Display name (or `local` for the management cluster)
    pub name: String,
    /// Server-assigned id
    pub id: String,
}

impl ClusterSummary {
    /// Whether this is the management cluster.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.id == LOCAL_CLUSTER
    }
}

#[derive(Debug, Default, Deserialize)]
struct AppliedSpec {
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClusterEntry {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "appliedSpec", default)]
    applied_spec: Option<AppliedSpec>,
}

impl ClusterEntry {
    fn display_name(&self) -> Option<&str> {
        let nested = self
            .applied_spec
            .as_ref()
            .and_then(|spec| spec.display_name.as_deref());
        nested
            .into_iter()
            .chain(self.name.as_deref())
            .find(|name| !name.is_empty())
    }
}

impl From<ClusterEntry> for ClusterSummary {
    fn from(entry: ClusterEntry) -> Self {
        if entry.id == LOCAL_CLUSTER {
            return ClusterSummary {
                name: LOCAL_CLUSTER.to_string(),
                id: LOCAL_CLUSTER.to_string(),
            };
        }
        let name = entry.display_name().unwrap_or(entry.id.as_str()).to_string();
        ClusterSummary { name, id: entry.id }
    }
}

#[derive(Debug, Deserialize)]
struct ClusterCollection {
    #[serde(default)]
    data: Vec<ClusterEntry>,
}

/// Decoded cluster listing, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterList {
    pub clusters: Vec<ClusterSummary>,
}

impl ClusterList {
    /// Decode a `/v3/clusters` response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON of the expected shape.
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        let collection: ClusterCollection = serde_json::from_slice(body)?;
        Ok(Self {
            clusters: collection.data.into_iter().map(Into::into).collect(),
        })
    }

    /// Collapse into a name to id mapping.
    ///
    /// Names are not unique on the server; a later entry overwrites an
    /// earlier one with the same name.
    #[must_use]
    pub fn into_map(self) -> ClusterMap {
        self.clusters
            .into_iter()
            .map(|cluster| (cluster.name, cluster.id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
