//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Certificate;
use tracing::{trace, warn};

use sbc_core::error::TransportError;
use sbc_core::{HttpRequest, HttpResponse, Method, Transport};

use crate::config::{TlsConfig, TrustAnchor};

/// HTTPS transport to a real device.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given TLS settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the trust anchor cannot be loaded or the TLS
    /// backend cannot be initialised.
    pub fn new(tls: &TlsConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(concat!("sbc-rest/", env!("CARGO_PKG_VERSION")));

        if tls.verify_certificate {
            if let Some(certificate) = load_trust_anchor(&tls.trust_anchor)? {
                builder = builder
                    .tls_built_in_root_certs(false)
                    .add_root_certificate(certificate);
            }
        } else {
            if tls.show_warnings {
                warn!("certificate verification is disabled; the device identity is not checked");
            }
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| TransportError::Tls {
            message: e.to_string(),
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let timeout = request.timeout;

        let mut builder = self.client.request(method, &request.url).timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        let status = response.status();
        trace!(status = %status, "HTTP response");

        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

fn load_trust_anchor(anchor: &TrustAnchor) -> Result<Option<Certificate>, TransportError> {
    let pem = match anchor {
        TrustAnchor::WebPki => return Ok(None),
        TrustAnchor::PemFile(path) => std::fs::read(path).map_err(|e| TransportError::Tls {
            message: format!("cannot read trust anchor {}: {}", path.display(), e),
        })?,
        TrustAnchor::Pem(pem) => pem.clone().into_bytes(),
    };

    Certificate::from_pem(&pem)
        .map(Some)
        .map_err(|e| TransportError::Tls {
            message: format!("invalid trust anchor: {}", e),
        })
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}
