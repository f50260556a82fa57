// SPDX-License-Identifier: MIT OR Apache-2.0

use kubectl_rancher::config::RancherConfig;
use kubectl_rancher::resources::LoginCredentials;
use kubectl_rancher::testkit::{cluster_list_body, kubeconfig_body, login_body, ScriptedResolver};
use kubectl_rancher::{RancherClient, RancherError, TrustPolicy};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "token-x7k2p:q9w8e7r6t5y4";
const KUBECONFIG: &str = "apiVersion: v1\nkind: Config\ncurrent-context: prod\n";

async fn rancher_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3-public/localProviders/local"))
        .and(query_param("action", "login"))
        .respond_with(ResponseTemplate::new(201).set_body_json(login_body(TOKEN)))
        .mount(&server)
        .await;

    // "token-x7k2p:q9w8e7r6t5y4" base64-encoded
    let auth = "Basic dG9rZW4teDdrMnA6cTl3OGU3cjZ0NXk0";

    Mock::given(method("GET"))
        .and(path("/v3/clusters"))
        .and(header("authorization", auth))
        .respond_with(ResponseTemplate::new(200).set_body_json(cluster_list_body(&[
            ("management", "local"),
            ("prod", "c-abc12"),
            ("staging", "c-def34"),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/clusters/c-abc12"))
        .and(query_param("action", "generateKubeconfig"))
        .and(header("authorization", auth))
        .respond_with(ResponseTemplate::new(200).set_body_json(kubeconfig_body(KUBECONFIG)))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_login_list_and_fetch() -> anyhow::Result<()> {
    let server = rancher_server().await;
    let tmp = tempfile::tempdir()?;
    let config_path = tmp.path().join(".kube").join("rancher.json");
    RancherConfig::bootstrap_at(&config_path)?;

    // 1. Login and persist the token the way the CLI does
    let resolver = ScriptedResolver::new().answer("RANCHER_PASSWORD", "s3cret");
    let mut config = RancherConfig::load_from_path(&config_path)?;
    config.url = Some(server.uri());

    let response = RancherClient::login(
        config.server_url()?,
        config.trust_policy(),
        LoginCredentials::new("admin", "", "local"),
        &resolver,
    )
    .await?;
    config.token = Some(response.into_token());
    config.password = Some("s3cret".to_string());
    config.save_to_path(&config_path)?;

    let saved = std::fs::read_to_string(&config_path)?;
    assert!(saved.contains(TOKEN));
    assert!(!saved.contains("s3cret"));

    // 2. Reload and list
    let config = RancherConfig::load_from_path(&config_path)?;
    let client = RancherClient::new(config.connection_parameters()?);
    let clusters = client.list_clusters().await?;

    assert_eq!(clusters.len(), 3);
    assert_eq!(clusters["local"], "local");
    assert_eq!(clusters["prod"], "c-abc12");
    assert!(!clusters.contains_key("management"));

    // 3. Fetch a kubeconfig
    let kube_dir = tmp.path().join(".kube");
    let written = client
        .fetch_kubeconfig_into(&clusters["prod"], "prod", &kube_dir)
        .await?;
    assert_eq!(written, kube_dir.join("prod.yaml"));
    assert_eq!(std::fs::read_to_string(&written)?, KUBECONFIG);

    Ok(())
}

#[tokio::test]
async fn test_wrong_token_is_rejected_by_server() -> anyhow::Result<()> {
    let server = rancher_server().await;
    Mock::given(method("GET"))
        .and(path("/v3/clusters"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = RancherConfig {
        url: Some(server.uri()),
        token: Some("token-other:nope".to_string()),
        ..Default::default()
    };
    let client = RancherClient::new(config.connection_parameters()?);

    let err = client.list_clusters().await.unwrap_err();
    assert!(matches!(err, RancherError::RemoteApi { status: 401 }));
    Ok(())
}

#[tokio::test]
async fn test_insecure_client_talks_plain_http() -> anyhow::Result<()> {
    let server = rancher_server().await;

    let config = RancherConfig {
        url: Some(server.uri()),
        token: Some(TOKEN.to_string()),
        insecure: true,
        ..Default::default()
    };
    assert_eq!(config.trust_policy(), TrustPolicy::insecure());

    let clusters = RancherClient::new(config.connection_parameters()?)
        .list_clusters()
        .await?;
    assert_eq!(clusters["staging"], "c-def34");
    Ok(())
}
