//! sbc-rest - REST management client for Session Border Controllers.
//!
//! Authentication produces a [`DeviceSession`], which is the capability
//! object for every other call: status and statistics, configuration lock
//! and element CRUD, admin actions, and the verify/save/activate workflow.
//!
//! # Example
//!
//! ```no_run
//! use sbc_core::{Credentials, DeviceUrl, ElementType, KeyAttributes};
//! use sbc_rest::{DeviceSession, SessionConfig};
//!
//! # async fn example() -> Result<(), sbc_core::Error> {
//! let config = SessionConfig::new(DeviceUrl::new("sbc.example.com")?);
//! let session = DeviceSession::connect(config, Credentials::new("admin", "secret")?).await?;
//!
//! let element_type = ElementType::new("session-group")?;
//! let keys = KeyAttributes::from_pairs([("group-name", "G1")])?;
//!
//! session.lock().await?;
//! session.delete_config_elements(&element_type, Some(&keys)).await?;
//! session.activate_configuration().await?;
//! session.unlock().await?;
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod session;
pub mod transport;
pub mod xml;

pub use activation::submit_and_await;
pub use client::RestClient;
pub use config::{ActivationPolicy, PollPolicy, SessionConfig, TlsConfig, TrustAnchor};
pub use session::DeviceSession;
pub use transport::ReqwestTransport;
pub use xml::{XmlDocument, XmlNode};
