//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sbc_core::{ApiVersion, DeviceUrl, Stage};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to reach a device, fixed at construction time.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use sbc_core::DeviceUrl;
/// use sbc_rest::SessionConfig;
///
/// let config = SessionConfig::new(DeviceUrl::new("sbc.example.com").unwrap())
///     .with_request_timeout(Duration::from_secs(5))
///     .with_verify_certificate(false)
///     .with_tls_warnings(false);
/// assert_eq!(config.request_timeout(), Duration::from_secs(5));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Management address of the device.
    pub host: DeviceUrl,

    /// REST API version used in endpoint paths.
    #[serde(default)]
    pub api_version: ApiVersion,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub tls: TlsConfig,

    #[serde(default)]
    pub activation: ActivationPolicy,
}

impl SessionConfig {
    /// Create a configuration with defaults for everything but the host.
    pub fn new(host: DeviceUrl) -> Self {
        Self {
            host,
            api_version: ApiVersion::default(),
            request_timeout_ms: default_request_timeout_ms(),
            tls: TlsConfig::default(),
            activation: ActivationPolicy::default(),
        }
    }

    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = duration_ms(timeout);
        self
    }

    /// Enable or disable verification of the device certificate.
    pub fn with_verify_certificate(mut self, verify: bool) -> Self {
        self.tls.verify_certificate = verify;
        self
    }

    /// Enable or disable the warning logged when verification is off.
    pub fn with_tls_warnings(mut self, show: bool) -> Self {
        self.tls.show_warnings = show;
        self
    }

    pub fn with_trust_anchor(mut self, anchor: TrustAnchor) -> Self {
        self.tls.trust_anchor = anchor;
        self
    }

    pub fn with_activation_policy(mut self, policy: ActivationPolicy) -> Self {
        self.activation = policy;
        self
    }

    /// Returns the per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// TLS settings for the production transport.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(default = "default_true")]
    pub verify_certificate: bool,

    #[serde(default = "default_true")]
    pub show_warnings: bool,

    #[serde(default)]
    pub trust_anchor: TrustAnchor,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            verify_certificate: true,
            show_warnings: true,
            trust_anchor: TrustAnchor::default(),
        }
    }
}

/// Root certificates the device certificate is verified against.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum TrustAnchor {
    /// The bundled Mozilla root set (covers publicly issued certificates).
    #[default]
    WebPki,
    /// A PEM file on disk.
    PemFile(PathBuf),
    /// PEM data already in memory.
    Pem(String),
}

/// Poll cadence for one configuration stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    pub interval_ms: u64,
    pub timeout_ms: u64,
}

impl PollPolicy {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval_ms: duration_ms(interval),
            timeout_ms: duration_ms(timeout),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Poll cadence for each stage of the activation workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationPolicy {
    pub verify: PollPolicy,
    pub save: PollPolicy,
    pub activate: PollPolicy,
}

impl ActivationPolicy {
    /// Returns the policy for a stage.
    pub fn for_stage(&self, stage: Stage) -> PollPolicy {
        match stage {
            Stage::Verify => self.verify,
            Stage::Save => self.save,
            Stage::Activate => self.activate,
        }
    }
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        let deadline = Duration::from_secs(15);
        Self {
            verify: PollPolicy::new(Duration::from_secs(3), deadline),
            save: PollPolicy::new(Duration::from_secs(2), deadline),
            activate: PollPolicy::new(Duration::from_secs(2), deadline),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    duration_ms(DEFAULT_REQUEST_TIMEOUT)
}

fn default_true() -> bool {
    true
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::new(DeviceUrl::new("sbc.example.com").unwrap());
        assert_eq!(config.api_version.as_str(), "v1.1");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.tls.verify_certificate);
        assert!(config.tls.show_warnings);

        let policy = config.activation;
        assert_eq!(policy.for_stage(Stage::Verify).interval(), Duration::from_secs(3));
        assert_eq!(policy.for_stage(Stage::Save).interval(), Duration::from_secs(2));
        assert_eq!(policy.for_stage(Stage::Activate).interval(), Duration::from_secs(2));
        for stage in Stage::ORDER {
            assert_eq!(policy.for_stage(stage).timeout(), Duration::from_secs(15));
        }
    }

    #[test]
    fn deserializes_minimal_config() {
        let config: SessionConfig = serde_json::from_str(r#"{"host": "sbc.example.com"}"#).unwrap();
        assert_eq!(config.host.host(), Some("sbc.example.com"));
        assert_eq!(config.request_timeout_ms, 10_000);
        assert!(matches!(config.tls.trust_anchor, TrustAnchor::WebPki));
    }

    #[test]
    fn deserializes_full_config() {
        let config: SessionConfig = serde_json::from_str(
            r#"{
                "host": "https://sbc.example.com:8443",
                "api_version": "v1.2",
                "request_timeout_ms": 2500,
                "tls": {
                    "verify_certificate": true,
                    "show_warnings": false,
                    "trust_anchor": {"kind": "pem_file", "value": "/etc/sbc/ca.pem"}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.api_version.as_str(), "v1.2");
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
        assert!(!config.tls.show_warnings);
        match config.tls.trust_anchor {
            TrustAnchor::PemFile(path) => assert_eq!(path, PathBuf::from("/etc/sbc/ca.pem")),
            other => panic!("unexpected trust anchor: {:?}", other),
        }
    }
}
