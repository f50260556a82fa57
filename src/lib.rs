// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod resources;
pub mod runtime;
pub mod testkit;

pub use client::{ConnectionParameters, RancherClient, TransportBuilder, TrustPolicy};
pub use error::RancherError;
pub use resources::{ClusterMap, ClusterSummary, KubeconfigDocument, LoginMethod};
