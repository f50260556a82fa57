// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration management for the Rancher plugin
//!
//! This module loads and writes the persisted plugin state
//! (`~/.kube/rancher.json`) and turns it into [`ConnectionParameters`].
//!
//! `RANCHER_CONFIG` overrides the state file location (default:
//! `~/.kube/rancher.json`). The other `RANCHER_*` variables are read by the
//! CLI together with its flags:
//!
//! - `RANCHER_URL` - Rancher server URL
//! - `RANCHER_TOKEN` - `username:password` API token
//! - `RANCHER_CA` - PEM CA bundle to trust in addition to the system roots
//! - `RANCHER_INSECURE` - Skip TLS verification (`1`/`true`/`yes`/`on` or
//!   `0`/`false`/`no`/`off`)
//! - `RANCHER_USER`, `RANCHER_PASSWORD`, `RANCHER_LOGIN_METHOD` - login fields
//!
//! [`ConnectionParameters`]: crate::ConnectionParameters

mod rancherconfig;

pub use rancherconfig::{RancherConfig, ENV_RANCHER_CONFIG, ENV_RANCHER_URL};
