// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport construction.
//!
//! Every outbound call gets a `reqwest::Client` whose TLS verification follows
//! a [`TrustPolicy`]: the operating system's root pool, optionally extended
//! with a custom CA bundle, or no verification at all for explicitly insecure
//! endpoints. Hosts without a readable system store get the bundled Mozilla
//! roots instead.

use crate::error::Result;
use rustls::pki_types::CertificateDer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Which server certificates a client accepts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrustPolicy {
    /// If true, skips TLS verification (insecure)
    pub insecure: bool,
    /// PEM bundle whose certificates are added to the root pool
    pub ca_path: Option<PathBuf>,
}

impl TrustPolicy {
    /// Verify against the system root pool only.
    #[must_use]
    pub fn system() -> Self {
        Self::default()
    }

    /// Accept any server certificate.
    #[must_use]
    pub fn insecure() -> Self {
        Self {
            insecure: true,
            ca_path: None,
        }
    }

    #[must_use]
    pub fn with_ca_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_path = Some(path.into());
        self
    }
}

/// Builds HTTP clients for a trust policy.
pub struct TransportBuilder;

impl TransportBuilder {
    /// Build a client bound to the TLS configuration described by `policy`.
    ///
    /// A custom CA file that cannot be read or parsed is logged and ignored;
    /// the client then trusts the system pool alone.
    ///
    /// # Errors
    ///
    /// Returns an error only if the HTTP client itself cannot be constructed.
    #[allow(clippy::result_large_err)]
    pub fn build(policy: &TrustPolicy) -> Result<reqwest::Client> {
        // Install ring as default crypto provider
        let _ = rustls::crypto::ring::default_provider().install_default();

        let mut tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(Self::root_store(policy))
            .with_no_client_auth();

        // insecure wins over a custom CA
        if policy.insecure {
            debug!("TLS certificate verification disabled");
            tls_config
                .dangerous()
                .set_certificate_verifier(Arc::new(NoVerifier));
        }

        tls_config.alpn_protocols = vec![b"http/1.1".to_vec()];

        let client = reqwest::Client::builder()
            .use_preconfigured_tls(tls_config)
            .build()?;
        Ok(client)
    }

    /// Assemble the root certificate pool for `policy`.
    pub fn root_store(policy: &TrustPolicy) -> rustls::RootCertStore {
        let mut root_store = Self::system_roots();

        if let Some(ca_path) = &policy.ca_path {
            match Self::load_ca_file(ca_path) {
                Ok(certs) => {
                    let (added, ignored) = root_store.add_parsable_certificates(certs);
                    if added == 0 {
                        warn!(
                            path = %ca_path.display(),
                            "Error appending CA cert file. No custom CA's will be added"
                        );
                    } else {
                        debug!(path = %ca_path.display(), added, ignored, "Added custom CA certificates");
                    }
                }
                Err(reason) => {
                    warn!(
                        path = %ca_path.display(),
                        %reason,
                        "Unable to read specified CA cert file. No custom CA's will be added"
                    );
                }
            }
        }

        root_store
    }

    /// Roots from the operating system trust store.
    ///
    /// Falls back to the bundled Mozilla set when the system store yields no
    /// usable certificate.
    pub fn system_roots() -> rustls::RootCertStore {
        let mut root_store = rustls::RootCertStore::empty();

        let native = rustls_native_certs::load_native_certs();
        for error in &native.errors {
            debug!(%error, "Skipping unreadable system certificate source");
        }
        let (added, ignored) = root_store.add_parsable_certificates(native.certs);
        debug!(added, ignored, "Loaded system root certificates");

        if added == 0 {
            warn!("No system root certificates found, using bundled roots");
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        }

        root_store
    }

    fn load_ca_file(path: &Path) -> std::result::Result<Vec<CertificateDer<'static>>, String> {
        let ca_pem = std::fs::read(path).map_err(|e| format!("Failed to read CA cert: {e}"))?;
        load_pem_certs(&ca_pem)
    }
}

/// Load PEM-encoded certificates
fn load_pem_certs(pem_data: &[u8]) -> std::result::Result<Vec<CertificateDer<'static>>, String> {
    let mut reader = std::io::BufReader::new(pem_data);
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("Failed to parse PEM certificates: {e}"))?;
    if certs.is_empty() {
        return Err("No certificates found in PEM data".to_string());
    }
    Ok(certs)
}

// Helper for insecure mode
#[derive(Debug)]
struct NoVerifier;

impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}
