//! Device URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

use super::ApiVersion;

/// A validated management address of an SBC.
///
/// Accepts either a bare host name or IP address, which is reached over
/// HTTPS, or an absolute URL. Plain HTTP is only allowed for loopback hosts.
///
/// # Example
///
/// ```
/// use sbc_core::{ApiVersion, DeviceUrl};
///
/// let device = DeviceUrl::new("sbc.example.com").unwrap();
/// assert_eq!(
///     device.api_url(&ApiVersion::default(), "system/status"),
///     "https://sbc.example.com/rest/v1.1/system/status"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeviceUrl(Url);

impl DeviceUrl {
    /// Create a new device URL from a host or URL string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref().trim();
        if s.is_empty() {
            return Err(InvalidInputError::DeviceUrl {
                value: s.to_string(),
                reason: "address cannot be empty".to_string(),
            }
            .into());
        }

        let candidate = if s.contains("://") {
            s.to_string()
        } else {
            format!("https://{}", s)
        };

        let url = Url::parse(&candidate).map_err(|e| InvalidInputError::DeviceUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        let mut normalized = url;
        normalized.set_query(None);
        normalized.set_fragment(None);
        let path = normalized.path().trim_end_matches('/').to_string();
        normalized.set_path(&path);

        Ok(Self(normalized))
    }

    /// Returns the URL of a versioned REST endpoint.
    pub fn api_url(&self, version: &ApiVersion, path: &str) -> String {
        format!(
            "{}/rest/{}/{}",
            self.base(),
            version,
            path.trim_start_matches('/')
        )
    }

    /// Returns the URL of the unversioned supported-versions endpoint.
    pub fn supported_versions_url(&self) -> String {
        format!("{}/rest/api/supportedversions", self.base())
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn base(&self) -> &str {
        // The URL crate always adds a trailing slash to root paths
        self.0.as_str().trim_end_matches('/')
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::DeviceUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_loopback = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_loopback) {
            return Err(InvalidInputError::DeviceUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for loopback)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(InvalidInputError::DeviceUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for DeviceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for DeviceUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for DeviceUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DeviceUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for DeviceUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_uses_https() {
        let device = DeviceUrl::new("sbc.example.com").unwrap();
        assert_eq!(device.host(), Some("sbc.example.com"));
        assert_eq!(device.as_url().scheme(), "https");
    }

    #[test]
    fn bare_ip_with_port() {
        let device = DeviceUrl::new("192.0.2.10:8443").unwrap();
        assert_eq!(
            device.api_url(&ApiVersion::default(), "auth/token"),
            "https://192.0.2.10:8443/rest/v1.1/auth/token"
        );
    }

    #[test]
    fn valid_loopback_http() {
        let device = DeviceUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(device.host(), Some("127.0.0.1"));
        assert_eq!(
            device.supported_versions_url(),
            "http://127.0.0.1:8080/rest/api/supportedversions"
        );
    }

    #[test]
    fn api_url_construction() {
        let device = DeviceUrl::new("https://sbc.example.com/").unwrap();
        let version = ApiVersion::new("v1.2").unwrap();
        assert_eq!(
            device.api_url(&version, "configuration/management?action=verify"),
            "https://sbc.example.com/rest/v1.2/configuration/management?action=verify"
        );
        assert_eq!(
            device.supported_versions_url(),
            "https://sbc.example.com/rest/api/supportedversions"
        );
    }

    #[test]
    fn invalid_http_non_loopback() {
        assert!(DeviceUrl::new("http://sbc.example.com").is_err());
    }

    #[test]
    fn invalid_empty() {
        assert!(DeviceUrl::new("").is_err());
        assert!(DeviceUrl::new("   ").is_err());
    }
}
