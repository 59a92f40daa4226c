// src/s3_client.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Construction of the S3 client from static credentials.
//!
//! The client is a per-invocation value: the action that runs builds it,
//! owns it, and drops it on every exit path. There is no process-global
//! SDK state to initialize or tear down.

use anyhow::{Context, Result, bail};
use aws_config::meta::region::RegionProviderChain;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_smithy_http_client::tls::rustls_provider::CryptoMode;
use aws_smithy_http_client::{Builder as HttpClientBuilder, tls};
use std::path::Path;
use std::time::Duration;
use std::{env, fs};
use tracing::debug;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Static credentials for one invocation.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl StaticCredentials {
    /// Resolve credentials: explicit flags win; otherwise fall back to
    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` (a `.env` file has
    /// already been folded into the environment by the caller).
    pub fn resolve(access_key: Option<String>, secret_key: Option<String>) -> Result<Self> {
        match (access_key, secret_key) {
            (Some(access_key_id), Some(secret_access_key)) => Ok(Self {
                access_key_id,
                secret_access_key,
            }),
            (None, None) => {
                let access_key_id = env::var("AWS_ACCESS_KEY_ID");
                let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY");
                match (access_key_id, secret_access_key) {
                    (Ok(access_key_id), Ok(secret_access_key)) => Ok(Self {
                        access_key_id,
                        secret_access_key,
                    }),
                    _ => bail!(
                        "Missing credentials: pass --access-key and --secret-key, or set \
                         AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY in the environment or a .env file."
                    ),
                }
            }
            _ => bail!("--access-key and --secret-key must be given together"),
        }
    }
}

/// Create a TLS context using a CA bundle file.
fn tls_context_from_pem(filename: impl AsRef<Path>) -> Result<tls::TlsContext> {
    let pem_contents = fs::read(&filename).with_context(|| {
        format!(
            "Failed to read CA bundle file: {}",
            filename.as_ref().display()
        )
    })?;

    let trust_store = tls::TrustStore::empty().with_pem_certificate(pem_contents.as_slice());

    tls::TlsContext::builder()
        .with_trust_store(trust_store)
        .build()
        .with_context(|| {
            format!(
                "Failed to build TLS context from PEM {}",
                filename.as_ref().display()
            )
        })
}

/// Per-operation timeout, overridable for slow or far-away endpoints.
fn operation_timeout() -> Duration {
    env::var("S3SMOKE_OPERATION_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(120))
}

/// Build an S3 client scoped to one action.
///
/// Region comes from `AWS_REGION` or the default provider chain; an
/// `AWS_ENDPOINT_URL` routes to an S3-compatible service, with path-style
/// addressing so bucket names never have to resolve as hostnames.
pub async fn build_client(creds: &StaticCredentials) -> Result<Client> {
    let region = RegionProviderChain::first_try(env::var("AWS_REGION").ok().map(Region::new))
        .or_default_provider()
        .or_else(Region::new(DEFAULT_REGION));

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(region)
        .credentials_provider(Credentials::new(
            &creds.access_key_id,
            &creds.secret_access_key,
            None,
            None,
            "Static",
        ));

    if let Ok(endpoint) = env::var("AWS_ENDPOINT_URL") {
        if !endpoint.is_empty() {
            debug!("using custom endpoint {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }
    }

    // Custom trust store for endpoints behind a private CA.
    if let Ok(ca_bundle_path) = env::var("AWS_CA_BUNDLE_PATH") {
        if !ca_bundle_path.is_empty() {
            debug!("loading CA bundle from {}", ca_bundle_path);
            let tls_context = tls_context_from_pem(&ca_bundle_path)?;
            let http_client = HttpClientBuilder::new()
                .tls_provider(tls::Provider::Rustls(CryptoMode::AwsLc))
                .tls_context(tls_context)
                .build_https();
            loader = loader.http_client(http_client);
        }
    }

    let timeout_config = TimeoutConfig::builder()
        .connect_timeout(Duration::from_secs(5))
        .operation_timeout(operation_timeout())
        .build();

    let cfg = loader.timeout_config(timeout_config).load().await;

    // Path-style is required for MinIO, Ceph and friends; plain AWS accepts
    // it as well.
    let s3_config = aws_sdk_s3::config::Builder::from(&cfg)
        .force_path_style(true)
        .build();
    Ok(Client::from_conf(s3_config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_keys_win() {
        let creds =
            StaticCredentials::resolve(Some("AKIA123".into()), Some("sekrit".into())).unwrap();
        assert_eq!(creds.access_key_id, "AKIA123");
        assert_eq!(creds.secret_access_key, "sekrit");
    }

    #[test]
    fn half_a_pair_is_rejected() {
        let result = StaticCredentials::resolve(Some("AKIA123".into()), None);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("must be given together")
        );
    }
}
