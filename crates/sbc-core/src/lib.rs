//! sbc-core - Core types and traits for the SBC REST management client.
//!
//! This crate holds everything the client shares with alternative transports:
//! validated domain types, credentials and access tokens, the unified
//! [`Error`] type and the [`Transport`] seam every HTTP exchange goes through.

pub mod credentials;
pub mod error;
pub mod tokens;
pub mod transport;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use tokens::{AccessToken, TOKEN_LIFETIME};
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
pub use types::{
    ApiVersion, ConfigElements, DeviceUrl, ElementType, GlobalSessions, KeyAttributes,
    OperationState, Role, Stage, StageOutcome,
};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
