// SPDX-License-Identifier: MIT OR Apache-2.0

mod transport;

pub use transport::{TransportBuilder, TrustPolicy};

use crate::error::{RancherError, Result};
use crate::prompt::{check_and_prompt, CredentialResolver};
use crate::resources::{
    redacted, ClusterList, ClusterMap, KubeconfigDocument, LoginCredentials, LoginMethod,
    LoginRequest, LoginResponse,
};
use crate::runtime::RequestLogger;
use base64::Engine;
use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything needed to talk to one Rancher server.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    /// Server origin, e.g. `https://rancher.example.com`
    pub base_url: String,
    pub trust: TrustPolicy,
    /// `username:password` API token, or empty for unauthenticated calls
    pub token: String,
}

impl ConnectionParameters {
    /// Create a new builder for the given server URL.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ConnectionParametersBuilder {
        ConnectionParametersBuilder {
            params: ConnectionParameters {
                base_url: base_url.into(),
                trust: TrustPolicy::default(),
                token: String::new(),
            },
        }
    }
}

impl std::fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("base_url", &self.base_url)
            .field("trust", &self.trust)
            .field("token", &redacted(&self.token))
            .finish()
    }
}

/// Builder for [`ConnectionParameters`].
#[derive(Debug, Clone)]
pub struct ConnectionParametersBuilder {
    params: ConnectionParameters,
}

impl ConnectionParametersBuilder {
    /// Set the `username:password` API token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.params.token = token.into();
        self
    }

    /// Add the certificates of a PEM bundle to the trusted roots.
    #[must_use]
    pub fn ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.params.trust.ca_path = Some(path.into());
        self
    }

    /// Skip TLS certificate verification.
    #[must_use]
    pub fn insecure(mut self) -> Self {
        self.params.trust.insecure = true;
        self
    }

    #[must_use]
    pub fn trust(mut self, trust: TrustPolicy) -> Self {
        self.params.trust = trust;
        self
    }

    #[must_use]
    pub fn build(self) -> ConnectionParameters {
        self.params
    }
}

/// Client for the Rancher v3 API.
///
/// Each operation sends exactly one request and waits for the whole
/// response. The client holds no mutable state; sharing one instance between
/// concurrent callers is left to the caller.
#[derive(Clone, Debug)]
pub struct RancherClient {
    params: ConnectionParameters,
    logger: RequestLogger,
}

impl RancherClient {
    /// Create a client. Parameters are stored as given and only checked when
    /// an operation runs.
    #[must_use]
    pub fn new(params: ConnectionParameters) -> Self {
        Self {
            params,
            logger: RequestLogger::new(),
        }
    }

    /// Replace the request logger.
    #[must_use]
    pub fn with_logger(mut self, logger: RequestLogger) -> Self {
        self.logger = logger;
        self
    }

    /// The parameters this client was built with.
    #[must_use]
    pub fn params(&self) -> &ConnectionParameters {
        &self.params
    }

    /// List the clusters the token has access to, keyed by display name.
    ///
    /// The management cluster always appears as `local -> local`. When two
    /// clusters share a display name the later one wins.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use kubectl_rancher::{ConnectionParameters, RancherClient};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = RancherClient::new(
    ///     ConnectionParameters::builder("https://rancher.example.com")
    ///         .token("token-abcde:s3cr3t")
    ///         .build(),
    /// );
    /// for (name, id) in client.list_clusters().await? {
    ///     println!("{id}\t{name}");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a cluster
    /// collection.
    pub async fn list_clusters(&self) -> Result<ClusterMap> {
        Ok(self.cluster_list().await?.into_map())
    }

    /// List clusters in server order, without collapsing duplicate names.
    ///
    /// # Errors
    ///
    /// Same as [`RancherClient::list_clusters`].
    pub async fn cluster_list(&self) -> Result<ClusterList> {
        let data = self.make_call("/v3/clusters", Method::GET, None).await?;
        let list = ClusterList::from_json(&data)?;
        debug!(count = list.len(), "Decoded cluster list");
        Ok(list)
    }

    /// Generate the kubeconfig for a cluster without writing it anywhere.
    ///
    /// # Errors
    ///
    /// Returns [`RancherError::EmptyResult`] if the server answers with no
    /// content, otherwise request and decode errors.
    pub async fn generate_kubeconfig(&self, cluster_id: &str) -> Result<KubeconfigDocument> {
        let uri = format!("/v3/clusters/{cluster_id}?action=generateKubeconfig");
        let data = self.make_call(&uri, Method::POST, None).await?;
        KubeconfigDocument::from_json(&data)
    }

    /// Fetch a cluster's kubeconfig and store it as `~/.kube/<cluster_name>.yaml`.
    ///
    /// `cluster_id` should come from [`RancherClient::list_clusters`];
    /// `cluster_name` only names the output file. An existing file is
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is unknown, the request fails,
    /// the response is empty or malformed, or the file cannot be written.
    pub async fn fetch_kubeconfig(&self, cluster_id: &str, cluster_name: &str) -> Result<PathBuf> {
        let dir = KubeconfigDocument::default_dir()?;
        self.fetch_kubeconfig_into(cluster_id, cluster_name, &dir)
            .await
    }

    /// Like [`RancherClient::fetch_kubeconfig`], writing into `dir` instead.
    ///
    /// # Errors
    ///
    /// See [`RancherClient::fetch_kubeconfig`].
    pub async fn fetch_kubeconfig_into(
        &self,
        cluster_id: &str,
        cluster_name: &str,
        dir: &Path,
    ) -> Result<PathBuf> {
        // reject unusable names before talking to the server
        KubeconfigDocument::output_path(dir, cluster_name)?;

        let document = self.generate_kubeconfig(cluster_id).await?;
        let path = document.write_to_dir(dir, cluster_name)?;
        info!(cluster = cluster_name, path = %path.display(), "Stored kubeconfig");
        Ok(path)
    }

    /// Exchange a username and password for an API token.
    ///
    /// Empty fields of `credentials` are requested from `resolver` in the
    /// order user, password (secret), login method. The login call itself is
    /// unauthenticated. The token is returned, not persisted.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use kubectl_rancher::prompt::TerminalResolver;
    /// use kubectl_rancher::resources::LoginCredentials;
    /// use kubectl_rancher::{RancherClient, TrustPolicy};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let response = RancherClient::login(
    ///     "https://rancher.example.com",
    ///     TrustPolicy::system(),
    ///     LoginCredentials::new("admin", "", "local"),
    ///     &TerminalResolver,
    /// )
    /// .await?;
    /// println!("token: {}", response.token);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`RancherError::UnsupportedMethod`] for a method other than
    /// `local` or `ldap` (no request is sent), [`RancherError::Decode`] if
    /// the response has no string `token`, and request errors.
    pub async fn login(
        base_url: impl Into<String>,
        trust: TrustPolicy,
        credentials: LoginCredentials,
        resolver: &dyn CredentialResolver,
    ) -> Result<LoginResponse> {
        Self::login_with_logger(base_url, trust, credentials, resolver, RequestLogger::new()).await
    }

    /// [`RancherClient::login`] with a caller-supplied request logger.
    ///
    /// # Errors
    ///
    /// See [`RancherClient::login`].
    pub async fn login_with_logger(
        base_url: impl Into<String>,
        trust: TrustPolicy,
        credentials: LoginCredentials,
        resolver: &dyn CredentialResolver,
        logger: RequestLogger,
    ) -> Result<LoginResponse> {
        let username = check_and_prompt(&credentials.username, "RANCHER_USER", false, resolver)?;
        let password =
            check_and_prompt(&credentials.password, "RANCHER_PASSWORD", true, resolver)?;
        let method = check_and_prompt(
            &credentials.method,
            "RANCHER_LOGIN_METHOD",
            false,
            resolver,
        )?;
        let method: LoginMethod = method.parse()?;

        let client = RancherClient::new(
            ConnectionParameters::builder(base_url)
                .trust(trust)
                .build(),
        )
        .with_logger(logger);
        let body = serde_json::to_vec(&LoginRequest {
            username: username.clone(),
            password,
        })?;

        let data = client
            .make_call(&method.login_uri(), Method::POST, Some(body))
            .await?;
        let response = LoginResponse::from_json(&data)?;
        info!(user = %username, %method, "Login succeeded");
        Ok(response)
    }

    /// Send one request and return the raw body of a successful response.
    async fn make_call(&self, uri: &str, method: Method, body: Option<Vec<u8>>) -> Result<Bytes> {
        let url = url::Url::parse(&format!(
            "{}{}",
            self.params.base_url.trim_end_matches('/'),
            uri
        ))
        .map_err(|e| RancherError::Config(format!("Invalid endpoint URL: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !self.params.token.is_empty() {
            let (username, password) = split_token(&self.params.token)?;
            headers.insert(AUTHORIZATION, basic_auth(username, password)?);
        }

        let client = TransportBuilder::build(&self.params.trust)?;

        let span = self.logger.start(method.as_str(), uri);
        self.logger.log_headers(&headers);

        let mut request = client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        // transport errors first; there is no response to look at
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.logger.finish_failure(span, &e);
                return Err(e.into());
            }
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            self.logger.finish_failure(span, &status);
            return Err(RancherError::RemoteApi {
                status: status.as_u16(),
            });
        }

        match response.bytes().await {
            Ok(data) => {
                self.logger.finish_success(span, status.as_u16());
                Ok(data)
            }
            Err(e) => {
                self.logger.finish_failure(span, &e);
                Err(e.into())
            }
        }
    }
}

/// Split a `username:password` token.
///
/// # Errors
///
/// Returns [`RancherError::InvalidCredentialFormat`] unless the token has
/// exactly one colon with text on both sides.
#[allow(clippy::result_large_err)]
pub fn split_token(token: &str) -> Result<(&str, &str)> {
    let mut parts = token.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(username), Some(password), None) if !username.is_empty() && !password.is_empty() => {
            Ok((username, password))
        }
        _ => Err(RancherError::InvalidCredentialFormat),
    }
}

#[allow(clippy::result_large_err)]
fn basic_auth(username: &str, password: &str) -> Result<HeaderValue> {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|_| RancherError::InvalidCredentialFormat)?;
    value.set_sensitive(true);
    Ok(value)
}
