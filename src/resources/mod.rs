// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strongly typed request and response shapes for the Rancher v3 API.

mod clusters;
mod kubeconfig;
mod login;

pub use clusters::{ClusterList, ClusterMap, ClusterSummary, LOCAL_CLUSTER};
pub use kubeconfig::KubeconfigDocument;
pub use login::{LoginCredentials, LoginMethod, LoginRequest, LoginResponse};

pub(crate) use login::redacted;
