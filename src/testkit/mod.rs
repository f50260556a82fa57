// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixtures for exercising the client against a stub Rancher server.
//!
//! The helpers build response bodies in the shapes the v3 API uses and a
//! scripted [`CredentialResolver`] that records what it was asked.

use crate::error::{RancherError, Result};
use crate::prompt::CredentialResolver;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;

/// `GET /v3/clusters` body using top-level `name` fields.
pub fn cluster_list_body(clusters: &[(&str, &str)]) -> Value {
    let data: Vec<Value> = clusters
        .iter()
        .map(|(name, id)| {
            json!({
                "type": "cluster",
                "name": name,
                "id": id,
                "actions": {
                    "generateKubeconfig": format!("/v3/clusters/{id}?action=generateKubeconfig"),
                },
            })
        })
        .collect();
    json!({ "type": "collection", "resourceType": "cluster", "data": data })
}

/// `GET /v3/clusters` body using nested `appliedSpec.displayName` fields.
pub fn applied_spec_cluster_list_body(clusters: &[(&str, &str)]) -> Value {
    let data: Vec<Value> = clusters
        .iter()
        .map(|(display_name, id)| {
            json!({
                "type": "cluster",
                "name": id,
                "id": id,
                "appliedSpec": { "displayName": display_name },
            })
        })
        .collect();
    json!({ "type": "collection", "data": data })
}

/// `generateKubeconfig` action output.
pub fn kubeconfig_body(config: &str) -> Value {
    json!({ "type": "generateKubeConfigOutput", "config": config })
}

/// Login action output.
pub fn login_body(token: &str) -> Value {
    json!({
        "type": "token",
        "token": token,
        "authProvider": "local",
        "ttl": 0,
    })
}

/// A credential resolver answering from a fixed table.
///
/// Every call is recorded as `(field, secret)`. Fields missing from the table
/// fail with [`RancherError::Prompt`].
#[derive(Debug, Default)]
pub struct ScriptedResolver {
    answers: HashMap<String, String>,
    asked: RefCell<Vec<(String, bool)>>,
}

impl ScriptedResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `field` with `value`.
    #[must_use]
    pub fn answer(mut self, field: &str, value: &str) -> Self {
        self.answers.insert(field.to_string(), value.to_string());
        self
    }

    /// Fields asked for so far, in order.
    pub fn asked(&self) -> Vec<(String, bool)> {
        self.asked.borrow().clone()
    }
}

impl CredentialResolver for ScriptedResolver {
    fn resolve(&self, field: &str, secret: bool) -> Result<String> {
        self.asked.borrow_mut().push((field.to_string(), secret));
        self.answers
            .get(field)
            .cloned()
            .ok_or_else(|| RancherError::Prompt(format!("no scripted answer for {field}")))
    }
}
