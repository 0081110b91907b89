//! Authenticated device session.

use tracing::{debug, info, instrument, warn};

use sbc_core::error::InvalidInputError;
use sbc_core::{
    AccessToken, ConfigElements, Credentials, ElementType, Error, GlobalSessions, HttpResponse,
    KeyAttributes, Method, Result, Role,
};

use crate::client::{RestClient, expect_status};
use crate::config::SessionConfig;
use crate::endpoints::{
    self, ADMIN_REBOOT, ADMIN_SWITCHOVER, CONFIG_ELEMENTS, CONFIG_LOCK, CONFIG_UNLOCK,
    GLOBAL_SESSIONS, SYSTEM_STATUS,
};
use crate::xml::XmlDocument;

/// An authenticated connection to an SBC.
///
/// The token is fixed for the lifetime of the session. When the device stops
/// accepting it (after about ten minutes), authenticate again to obtain a new
/// session; nothing is refreshed in place.
///
/// Sessions are cheap to clone and can be shared between tasks.
///
/// # Example
///
/// ```no_run
/// use sbc_core::{Credentials, DeviceUrl};
/// use sbc_rest::{DeviceSession, SessionConfig};
///
/// # async fn example() -> Result<(), sbc_core::Error> {
/// let config = SessionConfig::new(DeviceUrl::new("sbc.example.com")?);
/// let session = DeviceSession::connect(config, Credentials::new("admin", "secret")?).await?;
///
/// println!("role: {}", session.role().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DeviceSession {
    client: RestClient,
    token: AccessToken,
}

impl DeviceSession {
    /// Build a client from the configuration and authenticate with it.
    pub async fn connect(config: SessionConfig, credentials: Credentials) -> Result<Self> {
        RestClient::new(config)?.authenticate(credentials).await
    }

    /// Create a session from a token obtained earlier.
    ///
    /// The caller is responsible for the token still being valid.
    pub fn from_token(client: RestClient, token: AccessToken) -> Self {
        Self { client, token }
    }

    /// Returns the client this session runs on.
    pub fn client(&self) -> &RestClient {
        &self.client
    }

    /// Returns the access token of this session.
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    // ========================================================================
    // Status and Statistics
    // ========================================================================

    /// The high-availability role of the device.
    #[instrument(skip(self), fields(host = %self.client.config().host))]
    pub async fn role(&self) -> Result<Role> {
        let doc = self.get_xml("role", self.client.api_url(SYSTEM_STATUS)).await?;
        let role = Role::parse(&endpoints::parse_role(&doc)?);
        debug!(%role, "Role retrieved");
        Ok(role)
    }

    /// REST API versions the device supports, the latest one last.
    #[instrument(skip(self), fields(host = %self.client.config().host))]
    pub async fn supported_versions(&self) -> Result<Vec<String>> {
        let doc = self
            .get_xml("supported versions", self.client.supported_versions_url())
            .await?;
        Ok(endpoints::parse_supported_versions(&doc)?)
    }

    /// Global calls per second and connected sessions.
    #[instrument(skip(self), fields(host = %self.client.config().host))]
    pub async fn global_sessions(&self) -> Result<GlobalSessions> {
        let doc = self
            .get_xml("global sessions", self.client.api_url(GLOBAL_SESSIONS))
            .await?;
        Ok(endpoints::parse_global_sessions(&doc)?)
    }

    /// Global calls per second.
    pub async fn global_cps(&self) -> Result<String> {
        Ok(self.global_sessions().await?.cps)
    }

    /// Global number of connected sessions.
    pub async fn global_con_sessions(&self) -> Result<String> {
        Ok(self.global_sessions().await?.con_sessions)
    }

    // ========================================================================
    // Admin Actions
    // ========================================================================

    /// Reboot the device.
    ///
    /// Returns the link the device reports for the reboot. The call does not
    /// wait for the device to come back (about two minutes); poll
    /// [`DeviceSession::role`] to find out when it has.
    #[instrument(skip(self), fields(host = %self.client.config().host))]
    pub async fn reboot(&self) -> Result<String> {
        let response = self
            .send(Method::Post, self.client.api_url(ADMIN_REBOOT), None)
            .await?;
        let response = expect_status("reboot", response, |s| (200..300).contains(&s))?;

        let doc = XmlDocument::parse(&response.body)?;
        let link = endpoints::parse_link(&doc)?;
        info!(%link, "Reboot accepted");
        Ok(link)
    }

    /// Swap the active and standby devices of an HA pair.
    ///
    /// Returns once the device accepted the request; the switch itself takes
    /// a few more seconds.
    #[instrument(skip(self), fields(host = %self.client.config().host))]
    pub async fn switchover(&self) -> Result<()> {
        let response = self
            .send(Method::Post, self.client.api_url(ADMIN_SWITCHOVER), None)
            .await?;
        expect_status("switchover", response, |s| s == 204)?;
        info!("Switchover accepted");
        Ok(())
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Take the configuration lock.
    ///
    /// The device decides whether a second lock succeeds; a refusal is
    /// returned as an error.
    #[instrument(skip(self), fields(host = %self.client.config().host))]
    pub async fn lock(&self) -> Result<()> {
        let response = self
            .send(Method::Post, self.client.api_url(CONFIG_LOCK), None)
            .await?;
        expect_status("lock", response, |s| s == 204)?;
        info!("Configuration locked");
        Ok(())
    }

    /// Release the configuration lock.
    #[instrument(skip(self), fields(host = %self.client.config().host))]
    pub async fn unlock(&self) -> Result<()> {
        let response = self
            .send(Method::Post, self.client.api_url(CONFIG_UNLOCK), None)
            .await?;
        expect_status("unlock", response, |s| s == 204)?;
        info!("Configuration unlocked");
        Ok(())
    }

    /// Names of the attributes that identify an element of this type.
    ///
    /// Needed to address elements in [`DeviceSession::update_config_element`]
    /// and [`DeviceSession::delete_config_elements`].
    #[instrument(skip(self), fields(host = %self.client.config().host))]
    pub async fn config_element_key_attributes(
        &self,
        element_type: &ElementType,
    ) -> Result<Vec<String>> {
        let url = self.client.api_url(&endpoints::element_metadata(element_type));
        let doc = self.get_xml("element metadata", url).await?;
        let keys = endpoints::parse_key_attributes(&doc)?;
        debug!(?keys, "Key attributes retrieved");
        Ok(keys)
    }

    /// Running configuration elements of a type, optionally narrowed by keys.
    #[instrument(skip(self), fields(host = %self.client.config().host))]
    pub async fn get_config_elements(
        &self,
        element_type: &ElementType,
        keys: Option<&KeyAttributes>,
    ) -> Result<ConfigElements> {
        let url = self
            .client
            .api_url(&endpoints::running_config_elements(element_type, keys));
        let response = self.send(Method::Get, url, None).await?;
        let response = expect_status("get config elements", response, |s| s == 200)?;
        Ok(ConfigElements {
            status: response.status,
            body: response.body,
        })
    }

    /// Add a configuration element described by `xml`.
    #[instrument(skip(self, xml), fields(host = %self.client.config().host))]
    pub async fn add_config_element(&self, xml: &str) -> Result<()> {
        require_body(xml)?;
        let response = self
            .send(Method::Post, self.client.api_url(CONFIG_ELEMENTS), Some(xml))
            .await?;
        expect_status("add config element", response, |s| s == 200)?;
        info!("Configuration element added");
        Ok(())
    }

    /// Update the configuration element identified by the key attributes
    /// inside `xml`.
    #[instrument(skip(self, xml), fields(host = %self.client.config().host))]
    pub async fn update_config_element(&self, xml: &str) -> Result<()> {
        require_body(xml)?;
        let response = self
            .send(Method::Put, self.client.api_url(CONFIG_ELEMENTS), Some(xml))
            .await?;
        expect_status("update config element", response, |s| s == 200)?;
        info!("Configuration element updated");
        Ok(())
    }

    /// Delete configuration elements of a type, optionally narrowed by keys.
    #[instrument(skip(self), fields(host = %self.client.config().host))]
    pub async fn delete_config_elements(
        &self,
        element_type: &ElementType,
        keys: Option<&KeyAttributes>,
    ) -> Result<()> {
        let url = self
            .client
            .api_url(&endpoints::config_elements(element_type, keys));
        let response = self.send(Method::Delete, url, None).await?;
        expect_status("delete config elements", response, |s| s == 204)?;
        info!("Configuration elements deleted");
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    pub(crate) async fn send(
        &self,
        method: Method,
        url: String,
        xml: Option<&str>,
    ) -> Result<HttpResponse> {
        let mut request = self.client.authed_request(method, url, &self.token);
        if let Some(xml) = xml {
            request = RestClient::with_xml_body(request, xml);
        }
        self.client.execute(request).await
    }

    /// GET, require 200, parse the body.
    async fn get_xml(&self, operation: &str, url: String) -> Result<XmlDocument> {
        let response = self.send(Method::Get, url, None).await?;
        let response = expect_status(operation, response, |s| s == 200)?;
        XmlDocument::parse(&response.body).map_err(|e| {
            warn!(operation, error = %e, "Unreadable response body");
            Error::from(e)
        })
    }
}

fn require_body(xml: &str) -> Result<()> {
    if xml.trim().is_empty() {
        return Err(InvalidInputError::Other {
            message: "configuration element XML cannot be empty".to_string(),
        }
        .into());
    }
    Ok(())
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("client", &self.client)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
