//! Request execution against one device.

use std::sync::Arc;

use tracing::{debug, info, instrument, trace, warn};

use sbc_core::error::{AuthError, UnexpectedStatusError};
use sbc_core::{AccessToken, Credentials, HttpRequest, HttpResponse, Method, Result, Transport};

use crate::config::SessionConfig;
use crate::endpoints::{self, AUTH_TOKEN};
use crate::session::DeviceSession;
use crate::transport::ReqwestTransport;
use crate::xml::XmlDocument;

const ACCEPT_XML: &str = "application/xml";

/// A configured connection to one device, not yet authenticated.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: SessionConfig,
    transport: Arc<dyn Transport>,
}

impl RestClient {
    /// Create a client that talks HTTPS to the configured host.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS settings cannot be applied.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.tls)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on top of an arbitrary transport.
    pub fn with_transport(config: SessionConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ClientInner { config, transport }),
        }
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Exchange the credentials for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] for any status other than 200, a
    /// transport error if the device cannot be reached, and a parse error if
    /// the response carries no token.
    #[instrument(
        skip(self, credentials),
        fields(host = %self.inner.config.host, username = %credentials.username())
    )]
    pub async fn request_token(&self, credentials: &Credentials) -> Result<AccessToken> {
        debug!("Requesting access token");

        let request = self
            .request(Method::Post, self.api_url(AUTH_TOKEN))
            .header("Authorization", credentials.basic_authorization());

        let response = self.execute(request).await?;
        if response.status != 200 {
            warn!(status = response.status, reason = %response.reason, "Token request rejected");
            return Err(AuthError::Rejected {
                status: response.status,
                reason: response.reason,
            }
            .into());
        }

        let doc = XmlDocument::parse(&response.body)?;
        let token = AccessToken::new(endpoints::parse_access_token(&doc)?)?;

        info!("Access token obtained");
        Ok(token)
    }

    /// Authenticate and return a session for all further operations.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<DeviceSession> {
        let token = self.request_token(&credentials).await?;
        Ok(DeviceSession::from_token(self.clone(), token))
    }

    /// URL of a versioned endpoint on this device.
    pub fn api_url(&self, path: &str) -> String {
        let config = &self.inner.config;
        config.host.api_url(&config.api_version, path)
    }

    /// URL of the unversioned supported-versions endpoint.
    pub fn supported_versions_url(&self) -> String {
        self.inner.config.host.supported_versions_url()
    }

    /// A request with the `Accept` header and configured timeout.
    pub(crate) fn request(&self, method: Method, url: String) -> HttpRequest {
        HttpRequest::new(method, url, self.inner.config.request_timeout())
            .header("Accept", ACCEPT_XML)
    }

    /// A request that carries the bearer token.
    pub(crate) fn authed_request(
        &self,
        method: Method,
        url: String,
        token: &AccessToken,
    ) -> HttpRequest {
        self.request(method, url)
            .header("Authorization", token.bearer_authorization())
    }

    /// Attach an XML body.
    pub(crate) fn with_xml_body(request: HttpRequest, body: &str) -> HttpRequest {
        request.header("Content-Type", ACCEPT_XML).body(body)
    }

    pub(crate) async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        trace!(method = %request.method, url = %request.url, "HTTP request");
        let method = request.method;
        let response = self.inner.transport.send(request).await.map_err(|e| {
            warn!(%method, error = %e, "Request failed");
            e
        })?;
        trace!(status = response.status, "HTTP response");
        Ok(response)
    }
}

/// Turn a response outside the accepted set into an error.
pub(crate) fn expect_status(
    operation: &str,
    response: HttpResponse,
    accepted: impl Fn(u16) -> bool,
) -> Result<HttpResponse> {
    if accepted(response.status) {
        return Ok(response);
    }

    warn!(
        operation,
        status = response.status,
        reason = %response.reason,
        "Unexpected response status"
    );
    let message = endpoints::error_message(&response.body);
    Err(UnexpectedStatusError::new(operation, response.status, response.reason, message).into())
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("host", &self.inner.config.host)
            .field("api_version", &self.inner.config.api_version)
            .finish()
    }
}
