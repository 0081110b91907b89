//! Endpoint paths and response field selectors.

use sbc_core::error::ParseError;
use sbc_core::{ElementType, GlobalSessions, KeyAttributes, OperationState, Stage};

use crate::xml::XmlDocument;

// ============================================================================
// Endpoint Paths (relative to /rest/<version>/)
// ============================================================================

pub const AUTH_TOKEN: &str = "auth/token";

pub const SYSTEM_STATUS: &str = "system/status";

pub const ADMIN_REBOOT: &str = "admin/reboot";

pub const ADMIN_SWITCHOVER: &str = "admin/switchover";

pub const CONFIG_LOCK: &str = "configuration/lock";

pub const CONFIG_UNLOCK: &str = "configuration/unlock";

pub const CONFIG_ELEMENTS: &str = "configuration/configElements";

pub const GLOBAL_SESSIONS: &str = "statistics/kpis?type=globalSessions";

/// `configuration/elementTypes/metadata?elementType=<type>`
pub fn element_metadata(element_type: &ElementType) -> String {
    format!(
        "configuration/elementTypes/metadata?elementType={}",
        element_type
    )
}

/// `configuration/configElements?elementType=<type>&running=true<keys>`
pub fn running_config_elements(
    element_type: &ElementType,
    keys: Option<&KeyAttributes>,
) -> String {
    format!(
        "{}?elementType={}&running=true{}",
        CONFIG_ELEMENTS,
        element_type,
        keys.map(KeyAttributes::to_query_fragment).unwrap_or_default()
    )
}

/// `configuration/configElements?elementType=<type><keys>`
pub fn config_elements(
    element_type: &ElementType,
    keys: Option<&KeyAttributes>,
) -> String {
    format!(
        "{}?elementType={}{}",
        CONFIG_ELEMENTS,
        element_type,
        keys.map(KeyAttributes::to_query_fragment).unwrap_or_default()
    )
}

/// `configuration/management?action=<stage>`
pub fn management(stage: Stage) -> String {
    format!("configuration/management?action={}", stage)
}

// ============================================================================
// Field Selectors
// ============================================================================

const ACCESS_TOKEN: &str = "accessToken";
const ROLE: &str = "role";
const LINK: &str = "link";
const OPERATION_LINK: &str = "links/link";
const OPERATION: &str = "operationState/operation";
const OPERATION_STATUS: &str = "operationState/status";
const LATEST_VERSION: &str = "latestVersion";
const VERSION: &str = "version";
const GLOBAL_CPS: &str = "sysGlobalCPS";
const GLOBAL_CON_SESSIONS: &str = "sysGlobalConSessions";
const ATTRIBUTE_METADATA: &str = "data/attributeMetadata";
const ERROR_MESSAGE: &str = "messages/error/message";

// ============================================================================
// Response Parsers
// ============================================================================

pub fn parse_access_token(doc: &XmlDocument) -> Result<String, ParseError> {
    doc.require_text(ACCESS_TOKEN).map(str::to_string)
}

pub fn parse_role(doc: &XmlDocument) -> Result<String, ParseError> {
    doc.require_text(ROLE).map(str::to_string)
}

/// The `link` of an admin action response.
pub fn parse_link(doc: &XmlDocument) -> Result<String, ParseError> {
    non_empty(LINK, doc.require_text(LINK)?)
}

/// The status link of a submitted configuration operation.
pub fn parse_operation_link(doc: &XmlDocument) -> Result<String, ParseError> {
    non_empty(OPERATION_LINK, doc.require_text(OPERATION_LINK)?)
}

pub fn parse_operation_state(doc: &XmlDocument) -> Result<OperationState, ParseError> {
    Ok(OperationState::new(
        doc.require_text(OPERATION)?,
        doc.require_text(OPERATION_STATUS)?,
    ))
}

/// Every listed version, followed by the latest one.
pub fn parse_supported_versions(doc: &XmlDocument) -> Result<Vec<String>, ParseError> {
    let latest = doc.require_text(LATEST_VERSION)?;
    let mut versions: Vec<String> = doc.texts(VERSION).into_iter().map(str::to_string).collect();
    versions.push(latest.to_string());
    Ok(versions)
}

pub fn parse_global_sessions(doc: &XmlDocument) -> Result<GlobalSessions, ParseError> {
    Ok(GlobalSessions {
        cps: doc.require_text(GLOBAL_CPS)?.to_string(),
        con_sessions: doc.require_text(GLOBAL_CON_SESSIONS)?.to_string(),
    })
}

/// Names of the attributes flagged as key in element type metadata.
pub fn parse_key_attributes(doc: &XmlDocument) -> Result<Vec<String>, ParseError> {
    let mut keys = Vec::new();
    for metadata in doc.find_all(ATTRIBUTE_METADATA) {
        let name = metadata.child_text("name").ok_or_else(|| ParseError::MissingField {
            field: format!("{}/name", ATTRIBUTE_METADATA),
        })?;
        if metadata.child_text("key") == Some("true") {
            keys.push(name.to_string());
        }
    }
    Ok(keys)
}

/// The device's own error text, if the body carries one.
pub fn error_message(body: &str) -> Option<String> {
    let doc = XmlDocument::parse(body).ok()?;
    doc.text(ERROR_MESSAGE)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn non_empty(field: &str, value: &str) -> Result<String, ParseError> {
    if value.is_empty() {
        return Err(ParseError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}
