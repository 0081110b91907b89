//! Response bodies in the shape an SBC sends them.

use sbc_core::HttpResponse;

/// `200 OK` with `body`.
pub fn ok(body: impl Into<String>) -> HttpResponse {
    HttpResponse::new(200, "OK", body)
}

/// `202 Accepted` with `body`.
pub fn accepted(body: impl Into<String>) -> HttpResponse {
    HttpResponse::new(202, "Accepted", body)
}

/// `204 No Content`.
pub fn no_content() -> HttpResponse {
    HttpResponse::new(204, "No Content", "")
}

/// An error status whose body carries the device's error message.
pub fn status(code: u16, reason: &str, message: &str) -> HttpResponse {
    HttpResponse::new(code, reason, error(message))
}

pub fn token(value: &str) -> String {
    wrap(&format!("<data><accessToken>{}</accessToken></data>", escape(value)))
}

/// Admin action acknowledgement.
pub fn link(url: &str) -> String {
    wrap(&format!("<data><link>{}</link></data>", escape(url)))
}

/// Acknowledgement of a submitted configuration operation.
pub fn operation_link(url: &str) -> String {
    wrap(&format!("<links><link>{}</link></links>", escape(url)))
}

pub fn operation_state(operation: &str, status: &str) -> String {
    wrap(&format!(
        "<data><operationState><operation>{}</operation>\
         <status>{}</status></operationState></data>",
        escape(operation),
        escape(status)
    ))
}

pub fn role(role: &str) -> String {
    wrap(&format!(
        "<data><system><role>{}</role></system></data>",
        escape(role)
    ))
}

pub fn global_sessions(cps: &str, con_sessions: &str) -> String {
    wrap(&format!(
        "<data><kpis><sysGlobalCPS>{}</sysGlobalCPS>\
         <sysGlobalConSessions>{}</sysGlobalConSessions></kpis></data>",
        escape(cps),
        escape(con_sessions)
    ))
}

/// Supported API versions; `latest` is reported separately from `others`.
pub fn supported_versions(latest: &str, others: &[&str]) -> String {
    let versions: String = others
        .iter()
        .map(|v| format!("<version>{}</version>", escape(v)))
        .collect();
    wrap(&format!(
        "<data><versions>{}</versions><latestVersion>{}</latestVersion></data>",
        versions,
        escape(latest)
    ))
}

/// Element type metadata listing `(attribute name, is key)` pairs.
pub fn element_metadata(attributes: &[(&str, bool)]) -> String {
    let metadata: String = attributes
        .iter()
        .map(|(name, key)| {
            format!(
                "<attributeMetadata><name>{}</name><key>{}</key></attributeMetadata>",
                escape(name),
                key
            )
        })
        .collect();
    wrap(&format!("<data>{}</data>", metadata))
}

pub fn error(message: &str) -> String {
    wrap(&format!(
        "<messages><error><message>{}</message></error></messages>",
        escape(message)
    ))
}

fn wrap(inner: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><response>{}</response>",
        inner
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
