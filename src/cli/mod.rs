// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line interface of the `kubectl-rancher` plugin.
//!
//! Settings resolve in the order flag, `RANCHER_*` environment variable,
//! then `~/.kube/rancher.json`.

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};
use std::fmt::Write as _;
use std::path::Path;

use crate::client::RancherClient;
use crate::config::RancherConfig;
use crate::error::{RancherError, Result};
use crate::prompt::TerminalResolver;
use crate::resources::{ClusterMap, LoginCredentials};
use crate::runtime::{LoggingConfig, RequestLogger};

/// kubectl plugin to interact with the Rancher API
#[derive(Parser, Debug)]
#[command(name = "kubectl-rancher")]
#[command(version, about)]
#[command(long_about = "The plugin interacts with the Rancher API to list clusters, \
generate a KUBECONFIG file and set it up for the environment. This allows using the \
same Rancher API token to quickly switch between clusters and manipulate objects on them.")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Log every API call, including redacted request headers
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Rancher server url to connect to, of the form http(s)://host
    #[arg(long, env = "RANCHER_URL", global = true)]
    pub url: Option<String>,

    /// Rancher server api token to use
    #[arg(long, env = "RANCHER_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Rancher server ca cert location
    #[arg(long, env = "RANCHER_CA", global = true)]
    pub ca: Option<String>,

    /// Ignore tls check when connecting to rancher server
    #[arg(
        long,
        env = "RANCHER_INSECURE",
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub insecure: Option<bool>,
}

impl GlobalArgs {
    /// Layer the command-line values over the persisted configuration.
    #[must_use]
    pub fn apply(&self, mut config: RancherConfig) -> RancherConfig {
        if let Some(url) = non_empty(&self.url) {
            config.url = Some(url);
        }
        if let Some(token) = non_empty(&self.token) {
            config.token = Some(token);
        }
        if let Some(ca) = non_empty(&self.ca) {
            config.ca = Some(ca);
        }
        if let Some(insecure) = self.insecure {
            config.insecure = insecure;
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all the clusters the token has access to
    List,
    /// Fetch the kubeconfig file for a cluster and store it under ~/.kube
    Config(ConfigArgs),
    /// Login with credentials to generate a token for subsequent api calls
    Login(LoginArgs),
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Cluster name, as printed by `list`
    pub cluster_name: String,
}

#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// User name to use to login to Rancher api
    #[arg(long, env = "RANCHER_USER")]
    pub user: Option<String>,

    /// Password to use to login to Rancher api
    #[arg(long, env = "RANCHER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Method to use to login to Rancher api (local or ldap)
    #[arg(long = "login-method", env = "RANCHER_LOGIN_METHOD")]
    pub login_method: Option<String>,
}

impl LoginArgs {
    fn apply(&self, mut config: RancherConfig) -> RancherConfig {
        if let Some(user) = non_empty(&self.user) {
            config.user = Some(user);
        }
        if let Some(password) = non_empty(&self.password) {
            config.password = Some(password);
        }
        if let Some(method) = non_empty(&self.login_method) {
            config.login_method = Some(method);
        }
        config
    }
}

impl Cli {
    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        let config_path = RancherConfig::bootstrap()?;
        let config = self
            .global
            .apply(RancherConfig::load_from_path(&config_path)?);
        let logger = request_logger(self.verbose);

        match self.command {
            Commands::List => list(&config, logger).await,
            Commands::Config(args) => fetch_config(&config, &args.cluster_name, logger).await,
            Commands::Login(args) => login(args.apply(config), &config_path, logger).await,
        }
    }
}

/// Request logger for the `--verbose` setting.
#[must_use]
pub fn request_logger(verbose: bool) -> RequestLogger {
    if verbose {
        RequestLogger::with_config(LoggingConfig::verbose())
    } else {
        RequestLogger::new()
    }
}

async fn list(config: &RancherConfig, logger: RequestLogger) -> Result<()> {
    let client = RancherClient::new(config.connection_parameters()?).with_logger(logger);
    let clusters = client.list_clusters().await?;
    print!("{}", render_cluster_table(&clusters));
    Ok(())
}

async fn fetch_config(
    config: &RancherConfig,
    cluster_name: &str,
    logger: RequestLogger,
) -> Result<()> {
    let client = RancherClient::new(config.connection_parameters()?).with_logger(logger);
    let clusters = client.list_clusters().await?;
    let cluster_id = lookup_cluster(&clusters, cluster_name)?;

    let path = client.fetch_kubeconfig(cluster_id, cluster_name).await?;
    println!("Cluster config stored in {}", path.display());
    println!("To use it run: export KUBECONFIG={}", path.display());
    Ok(())
}

async fn login(
    mut config: RancherConfig,
    config_path: &Path,
    logger: RequestLogger,
) -> Result<()> {
    let credentials = LoginCredentials::new(
        config.user.clone().unwrap_or_default(),
        config.password.clone().unwrap_or_default(),
        config.login_method.clone().unwrap_or_default(),
    );
    let response = RancherClient::login_with_logger(
        config.server_url()?,
        config.trust_policy(),
        credentials,
        &TerminalResolver,
        logger,
    )
    .await?;

    config.token = Some(response.into_token());
    config.save_to_path(config_path)?;
    println!("Login successful, token stored in {}", config_path.display());
    Ok(())
}

/// Find the id of `cluster_name` in a cluster listing.
///
/// # Errors
///
/// Returns [`RancherError::UnknownCluster`] if the name is not listed.
#[allow(clippy::result_large_err)]
pub fn lookup_cluster<'a>(clusters: &'a ClusterMap, cluster_name: &str) -> Result<&'a str> {
    clusters
        .get(cluster_name)
        .map(String::as_str)
        .ok_or_else(|| RancherError::UnknownCluster(cluster_name.to_string()))
}

/// Format a listing as the `ID / NAME` table printed by `list`.
#[must_use]
pub fn render_cluster_table(clusters: &ClusterMap) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>7} \t {}", "ID", "NAME");
    for (name, id) in clusters {
        let _ = writeln!(out, "{:>7} \t {}", id, name);
    }
    out
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
