//! System status and statistics values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// High-availability role of an SBC.
///
/// Configuration changes are only accepted on a standalone or active device.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Standalone,
    Active,
    Standby,
    /// A role string this library does not know.
    #[serde(untagged)]
    Other(String),
}

impl Role {
    /// Interpret a role as reported by the device.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "standalone" => Role::Standalone,
            "active" => Role::Active,
            "standby" => Role::Standby,
            _ => Role::Other(s.trim().to_string()),
        }
    }

    /// Returns the role string.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Standalone => "standalone",
            Role::Active => "active",
            Role::Standby => "standby",
            Role::Other(s) => s,
        }
    }

    /// Whether the device accepts configuration changes in this role.
    pub fn accepts_configuration(&self) -> bool {
        matches!(self, Role::Standalone | Role::Active)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Global session KPIs.
///
/// Values are kept as the text the device reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSessions {
    /// Global calls per second.
    pub cps: String,
    /// Global number of connected sessions.
    pub con_sessions: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!(Role::parse("active"), Role::Active);
        assert_eq!(Role::parse(" Standby "), Role::Standby);
        assert_eq!(Role::parse("standalone"), Role::Standalone);
        assert_eq!(Role::parse("outOfService"), Role::Other("outOfService".into()));
    }

    #[test]
    fn configuration_roles() {
        assert!(Role::Active.accepts_configuration());
        assert!(Role::Standalone.accepts_configuration());
        assert!(!Role::Standby.accepts_configuration());
    }
}
