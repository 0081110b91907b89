//! Error types for the SBC client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, response status, parsing, configuration stage
//! and input validation errors.

use std::fmt;
use thiserror::Error;

use crate::types::Stage;

/// The unified error type for SBC client operations.
///
/// Every operation returns this error on failure, so callers can decide per
/// variant whether to retry, re-authenticate or abort.
#[derive(Debug, Error)]
pub enum Error {
    /// The device could not be reached (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The token request was refused.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The device answered with a status code the operation does not accept.
    #[error("unexpected status: {0}")]
    UnexpectedStatus(#[from] UnexpectedStatusError),

    /// A response body was not the XML document the operation expects.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A configuration stage failed or did not finish in time.
    #[error("stage error: {0}")]
    Stage(#[from] StageError),

    /// Input validation errors (credentials, element types, key attributes).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the configuration stage this error belongs to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage(StageError::TimedOut { stage, .. })
            | Error::Stage(StageError::Failed { stage, .. }) => Some(*stage),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// TLS setup or handshake error.
    #[error("TLS error: {message}")]
    Tls { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint answered with something other than 200.
    #[error("token request rejected: HTTP {status} {reason}")]
    Rejected { status: u16, reason: String },

    /// The device issued an unusable token.
    #[error("invalid access token: {reason}")]
    InvalidToken { reason: String },
}

/// A response whose status code is outside the set an operation accepts.
#[derive(Debug)]
pub struct UnexpectedStatusError {
    /// The operation that received the response (e.g. "lock").
    pub operation: String,
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status code.
    pub reason: String,
    /// Error text reported by the device, if the body carried one.
    pub message: Option<String>,
}

impl fmt::Display for UnexpectedStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: HTTP {}", self.operation, self.status)?;
        if !self.reason.is_empty() {
            write!(f, " {}", self.reason)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for UnexpectedStatusError {}

impl UnexpectedStatusError {
    /// Create a new unexpected status error.
    pub fn new(
        operation: impl Into<String>,
        status: u16,
        reason: impl Into<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            status,
            reason: reason.into(),
            message,
        }
    }

    /// Check if the device refused the bearer token.
    ///
    /// Tokens are not refreshed; a caller seeing this should authenticate
    /// again and retry with the new session.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Errors extracting data from a response body.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body is not well-formed XML.
    #[error("malformed XML: {message}")]
    Malformed { message: String },

    /// A required field is absent.
    #[error("missing field '{field}'")]
    MissingField { field: String },

    /// A field is present but its value cannot be used.
    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },
}

/// Errors from the verify/save/activate workflow.
#[derive(Debug, Error)]
pub enum StageError {
    /// The stage did not reach success before its deadline.
    #[error("{stage} did not complete within {waited_ms}ms")]
    TimedOut { stage: Stage, waited_ms: u64 },

    /// The device reported the stage as failed, or polling was refused.
    #[error("{stage} failed: {detail}")]
    Failed { stage: Stage, detail: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid credentials.
    #[error("invalid credentials: {reason}")]
    Credentials { reason: String },

    /// Invalid device address.
    #[error("invalid device URL '{value}': {reason}")]
    DeviceUrl { value: String, reason: String },

    /// Invalid API version.
    #[error("invalid API version '{value}': {reason}")]
    ApiVersion { value: String, reason: String },

    /// Invalid configuration element type.
    #[error("invalid element type '{value}': {reason}")]
    ElementType { value: String, reason: String },

    /// Invalid key attribute pair.
    #[error("invalid key attribute '{name}': {reason}")]
    KeyAttribute { name: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
