// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed wrappers for credential login.

use crate::error::{RancherError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Authentication provider used for login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMethod {
    /// Rancher's built-in user database.
    #[default]
    Local,
    /// OpenLDAP provider.
    Ldap,
}

impl LoginMethod {
    /// Provider path under `/v3-public`.
    #[must_use]
    pub fn provider_path(&self) -> &'static str {
        match self {
            LoginMethod::Local => "/localProviders/local",
            LoginMethod::Ldap => "/openLdapProviders/openldap",
        }
    }

    /// Relative URI of the login action for this provider.
    #[must_use]
    pub fn login_uri(&self) -> String {
        format!("/v3-public{}?action=login", self.provider_path())
    }
}

impl FromStr for LoginMethod {
    type Err = RancherError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(LoginMethod::Local),
            "ldap" => Ok(LoginMethod::Ldap),
            other => Err(RancherError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl std::fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginMethod::Local => write!(f, "local"),
            LoginMethod::Ldap => write!(f, "ldap"),
        }
    }
}

/// Login fields as supplied by the caller. Empty fields are resolved
/// interactively before the request is sent.
#[derive(Clone, Default)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
    pub method: String,
}

impl LoginCredentials {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            method: method.into(),
        }
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("method", &self.method)
            .finish()
    }
}

/// Body of a login action.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

/// Token minted by a successful login.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

impl LoginResponse {
    /// Decode a login response body.
    ///
    /// # Errors
    ///
    /// Returns [`RancherError::Decode`] if the body is not JSON or has no
    /// string `token` field.
    #[allow(clippy::result_large_err)]
    pub fn from_json(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    #[must_use]
    pub fn into_token(self) -> String {
        self.token
    }
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &redacted(&self.token))
            .finish()
    }
}

pub(crate) fn redacted(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "[REDACTED]"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!("local".parse::<LoginMethod>().unwrap(), LoginMethod::Local);
        assert_eq!("ldap".parse::<LoginMethod>().unwrap(), LoginMethod::Ldap);

        let err = "bogus".parse::<LoginMethod>().unwrap_err();
        assert!(matches!(err, RancherError::UnsupportedMethod(m) if m == "bogus"));
        assert!("LOCAL".parse::<LoginMethod>().is_err());
    }

    #[test]
    fn test_login_uri() {
        assert_eq!(
            LoginMethod::Local.login_uri(),
            "/v3-public/localProviders/local?action=login"
        );
        assert_eq!(
            LoginMethod::Ldap.login_uri(),
            "/v3-public/openLdapProviders/openldap?action=login"
        );
    }

    #[test]
    fn test_request_body() {
        let request = LoginRequest {
            username: "admin".to_string(),
            password: "s3cret".to_string(),
        };
        let body: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"username": "admin", "password": "s3cret"})
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let request = LoginRequest {
            username: "admin".to_string(),
            password: "s3cret".to_string(),
        };
        let creds = LoginCredentials::new("admin", "s3cret", "local");
        let response = LoginResponse {
            token: "token-abc:xyz".to_string(),
        };

        assert!(!format!("{request:?}").contains("s3cret"));
        assert!(!format!("{creds:?}").contains("s3cret"));
        assert!(!format!("{response:?}").contains("xyz"));
    }

    #[test]
    fn test_response_decode() {
        let response =
            LoginResponse::from_json(br#"{"type":"token","token":"token-abc:xyz","ttl":0}"#)
                .unwrap();
        assert_eq!(response.into_token(), "token-abc:xyz");
    }

    #[test]
    fn test_response_missing_or_non_string_token() {
        let bodies: [&[u8]; 3] = [br#"{"type":"token"}"#, br#"{"token":123}"#, b"not json"];
        for body in bodies {
            let err = LoginResponse::from_json(body).unwrap_err();
            assert!(matches!(err, RancherError::Decode(_)));
        }
    }
}
