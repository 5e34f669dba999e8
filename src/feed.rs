// HTTP client for the Wikimedia "on this day" births feed
use crate::model::Entry;

use http::{Method, Request, Uri, header};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_FEED_URL: &str = "https://api.wikimedia.org/feed/v1/wikipedia/en/onthisday";

const USER_AGENT: &str = concat!("onthisday/", env!("CARGO_PKG_VERSION"));

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("invalid date {month:02}/{day:02}")]
    InvalidDate { month: u32, day: u32 },
    #[error("client setup failed: {0}")]
    Setup(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed feed response: {0}")]
    Parse(String),
}

#[derive(Clone, Debug)]
pub struct FeedClient {
    client: HttpsClient,
    base_url: String,
}

impl FeedClient {
    pub fn new(base_url: &str, insecure: bool) -> Result<Self, FetchError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        base_url
            .parse::<Uri>()
            .map_err(|e| FetchError::Setup(e.to_string()))?;

        let https_connector = if insecure {
            let tls_config = rustls::ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerifier))
                .with_no_client_auth();

            HttpsConnectorBuilder::new()
                .with_tls_config(tls_config)
                .https_or_http()
                .enable_http1()
                .build()
        } else {
            let mut root_store = rustls::RootCertStore::empty();
            let result = rustls_native_certs::load_native_certs();
            root_store.add_parsable_certificates(result.certs);

            if root_store.is_empty() {
                return Err(FetchError::Setup(
                    "No valid system certificates found.".to_string(),
                ));
            }

            let tls_config = rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();

            HttpsConnectorBuilder::new()
                .with_tls_config(tls_config)
                .https_or_http()
                .enable_http1()
                .build()
        };

        let client = Client::builder(TokioExecutor::new()).build(https_connector);
        Ok(Self { client, base_url })
    }

    pub fn births_url(&self, month: u32, day: u32) -> Result<String, FetchError> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(FetchError::InvalidDate { month, day });
        }
        Ok(format!("{}/births/{:02}/{:02}", self.base_url, month, day))
    }

    /// Fetches the births list for a month/day. Feed order is preserved.
    pub async fn fetch_births(&self, month: u32, day: u32) -> Result<Vec<Entry>, FetchError> {
        let url = self.births_url(month, day)?;
        debug!(%url, "fetching births");

        let uri: Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| FetchError::Setup(e.to_string()))?;
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
            .body(String::new())
            .map_err(|e| FetchError::Setup(e.to_string()))?;

        let response = self
            .client
            .request(req)
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "feed returned an error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?
            .to_bytes();

        let births = parse_births(&body)?;
        debug!(%url, count = births.len(), "births loaded");
        Ok(births)
    }
}

/// Extracts the `births` array. Items without usable `text`/`year` are skipped.
pub fn parse_births(body: &[u8]) -> Result<Vec<Entry>, FetchError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    let births = value
        .get("births")
        .and_then(|b| b.as_array())
        .ok_or_else(|| FetchError::Parse("missing births array".to_string()))?;
    Ok(births.iter().filter_map(Entry::from_feed_value).collect())
}

#[derive(Debug)]
struct NoVerifier;
impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &[rustls::pki_types::CertificateDer<'_>],
        _: &rustls::pki_types::ServerName<'_>,
        _: &[u8],
        _: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }
    fn verify_tls12_signature(
        &self,
        _: &[u8],
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }
    fn verify_tls13_signature(
        &self,
        _: &[u8],
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }
    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        use rustls::SignatureScheme::*;
        vec![
            RSA_PKCS1_SHA256,
            RSA_PKCS1_SHA384,
            RSA_PKCS1_SHA512,
            ECDSA_NISTP256_SHA256,
            ECDSA_NISTP384_SHA384,
            RSA_PSS_SHA256,
            ED25519,
        ]
    }
}
