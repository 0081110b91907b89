//! sbc-sim - A scripted stand-in for an SBC.
//!
//! [`ScriptedTransport`] answers requests from a table of canned responses
//! and records every request it sees, so tests can assert exactly which calls
//! a workflow made. [`responses`] builds the XML bodies a device sends.

pub mod responses;
mod transport;

pub use transport::{RecordedCall, ScriptedTransport};
