//! Mock device tests for sbc-rest.
//!
//! These tests use wiremock to stand in for an SBC and exercise the client
//! over real HTTP without a device or credentials.

use sbc_core::error::{AuthError, ParseError};
use sbc_core::{Credentials, DeviceUrl, ElementType, Error, KeyAttributes, Role};
use sbc_rest::{DeviceSession, RestClient, SessionConfig};
use sbc_sim::responses;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "tok-123";

fn mock_config(server: &MockServer) -> SessionConfig {
    // Plain HTTP is accepted for loopback addresses
    let host = DeviceUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap();
    SessionConfig::new(host)
}

fn credentials() -> Credentials {
    Credentials::new("admin", "secret").unwrap()
}

fn xml(status: u16, body: String) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("content-type", "application/xml")
        .set_body_string(body)
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/rest/v1.1/auth/token"))
        .respond_with(xml(200, responses::token(TOKEN)))
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> DeviceSession {
    mount_token(server).await;
    DeviceSession::connect(mock_config(server), credentials())
        .await
        .unwrap()
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_authenticate_sends_basic_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1.1/auth/token"))
        .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
        .respond_with(xml(200, responses::token(TOKEN)))
        .expect(1)
        .mount(&server)
        .await;

    let session = DeviceSession::connect(mock_config(&server), credentials())
        .await
        .unwrap();

    assert_eq!(session.token().as_str(), TOKEN);
    assert!(!session.token().is_expired());
}

#[tokio::test]
async fn test_session_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1.1/system/status"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(xml(200, responses::role("active")))
        .expect(1)
        .mount(&server)
        .await;

    let session = connect(&server).await;
    assert_eq!(session.role().await.unwrap(), Role::Active);
}

#[tokio::test]
async fn test_authenticate_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1.1/auth/token"))
        .respond_with(xml(401, responses::error("Invalid credentials")))
        .mount(&server)
        .await;

    let client = RestClient::new(mock_config(&server)).unwrap();
    let err = client.authenticate(credentials()).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Auth(AuthError::Rejected { status: 401, .. })
    ));
    assert!(err.to_string().contains("401"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_authenticate_without_token_in_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1.1/auth/token"))
        .respond_with(xml(200, "<response><data/></response>".to_string()))
        .mount(&server)
        .await;

    let result = DeviceSession::connect(mock_config(&server), credentials()).await;
    assert!(matches!(
        result,
        Err(Error::Parse(ParseError::MissingField { .. }))
    ));
}

#[tokio::test]
async fn test_unreachable_device() {
    // Nothing listens on the tcpmux port
    let config = SessionConfig::new(DeviceUrl::new("http://127.0.0.1:1").unwrap());

    let result = DeviceSession::connect(config, credentials()).await;
    assert!(matches!(result, Err(Error::Transport(_))));
}

// ============================================================================
// Status and Statistics Tests
// ============================================================================

#[tokio::test]
async fn test_role_standby() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1.1/system/status"))
        .respond_with(xml(200, responses::role("standby")))
        .mount(&server)
        .await;

    let session = connect(&server).await;
    let role = session.role().await.unwrap();
    assert_eq!(role, Role::Standby);
    assert!(!role.accepts_configuration());
}

#[tokio::test]
async fn test_role_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1.1/system/status"))
        .respond_with(xml(500, responses::error("internal error")))
        .mount(&server)
        .await;

    let session = connect(&server).await;
    match session.role().await.unwrap_err() {
        Error::UnexpectedStatus(e) => {
            assert_eq!(e.status, 500);
            assert_eq!(e.message.as_deref(), Some("internal error"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_supported_versions() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/supportedversions"))
        .respond_with(xml(
            200,
            responses::supported_versions("v1.2", &["v1.0", "v1.1"]),
        ))
        .mount(&server)
        .await;

    let session = connect(&server).await;
    let versions = session.supported_versions().await.unwrap();
    assert_eq!(versions, vec!["v1.0", "v1.1", "v1.2"]);
}

#[tokio::test]
async fn test_global_sessions() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1.1/statistics/kpis"))
        .and(query_param("type", "globalSessions"))
        .respond_with(xml(200, responses::global_sessions("12", "345")))
        .mount(&server)
        .await;

    let session = connect(&server).await;
    assert_eq!(session.global_cps().await.unwrap(), "12");
    assert_eq!(session.global_con_sessions().await.unwrap(), "345");
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[tokio::test]
async fn test_key_attributes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1.1/configuration/elementTypes/metadata"))
        .and(query_param("elementType", "session-group"))
        .respond_with(xml(
            200,
            responses::element_metadata(&[
                ("group-name", true),
                ("description", false),
                ("state", false),
            ]),
        ))
        .mount(&server)
        .await;

    let session = connect(&server).await;
    let element_type = ElementType::new("session-group").unwrap();
    let keys = session
        .config_element_key_attributes(&element_type)
        .await
        .unwrap();
    assert_eq!(keys, vec!["group-name"]);
}

#[tokio::test]
async fn test_get_config_elements_with_keys() {
    let server = MockServer::start().await;
    let body = "<response><data><sessionGroup><groupName>G1</groupName></sessionGroup>\
                </data></response>";

    Mock::given(method("GET"))
        .and(path("/rest/v1.1/configuration/configElements"))
        .and(query_param("elementType", "session-group"))
        .and(query_param("running", "true"))
        .and(query_param("group-name", "G1"))
        .respond_with(xml(200, body.to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let session = connect(&server).await;
    let element_type = ElementType::new("session-group").unwrap();
    let keys = KeyAttributes::from_pairs([("group-name", "G1")]).unwrap();

    let elements = session
        .get_config_elements(&element_type, Some(&keys))
        .await
        .unwrap();
    assert_eq!(elements.status, 200);
    assert_eq!(elements.body, body);
}

#[tokio::test]
async fn test_get_config_elements_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1.1/configuration/configElements"))
        .respond_with(xml(404, responses::error("element not found")))
        .mount(&server)
        .await;

    let session = connect(&server).await;
    let element_type = ElementType::new("session-group").unwrap();
    let err = session
        .get_config_elements(&element_type, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_add_and_update_config_element() {
    let server = MockServer::start().await;
    let element = "<configElement><elementType>session-group</elementType></configElement>";

    Mock::given(method("POST"))
        .and(path("/rest/v1.1/configuration/configElements"))
        .and(header("content-type", "application/xml"))
        .and(body_string(element))
        .respond_with(xml(200, element.to_string()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/rest/v1.1/configuration/configElements"))
        .and(body_string(element))
        .respond_with(xml(200, element.to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let session = connect(&server).await;
    session.add_config_element(element).await.unwrap();
    session.update_config_element(element).await.unwrap();
}

#[tokio::test]
async fn test_add_config_element_rejects_empty_body() {
    let server = MockServer::start().await;
    let session = connect(&server).await;

    let result = session.add_config_element("  ").await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    // Only the token request reached the device
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_delete_config_elements() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1.1/configuration/configElements"))
        .and(query_param("elementType", "session-group"))
        .and(query_param("group-name", "G1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let session = connect(&server).await;
    let element_type = ElementType::new("session-group").unwrap();
    let keys = KeyAttributes::from_pairs([("group-name", "G1")]).unwrap();
    session
        .delete_config_elements(&element_type, Some(&keys))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_requires_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1.1/configuration/configElements"))
        .respond_with(xml(200, "<response/>".to_string()))
        .mount(&server)
        .await;

    let session = connect(&server).await;
    let element_type = ElementType::new("session-group").unwrap();
    let err = session
        .delete_config_elements(&element_type, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus(ref e) if e.status == 200));
}

#[tokio::test]
async fn test_second_lock_is_refused() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1.1/configuration/lock"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1.1/configuration/lock"))
        .respond_with(xml(409, responses::error("configuration is already locked")))
        .mount(&server)
        .await;

    let session = connect(&server).await;
    session.lock().await.unwrap();

    match session.lock().await.unwrap_err() {
        Error::UnexpectedStatus(e) => {
            assert_eq!(e.operation, "lock");
            assert_eq!(e.status, 409);
            assert_eq!(
                e.message.as_deref(),
                Some("configuration is already locked")
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unlock() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1.1/configuration/unlock"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let session = connect(&server).await;
    session.unlock().await.unwrap();
}

// ============================================================================
// Admin Action Tests
// ============================================================================

#[tokio::test]
async fn test_switchover_accepted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1.1/admin/switchover"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let session = connect(&server).await;
    session.switchover().await.unwrap();
}

#[tokio::test]
async fn test_switchover_requires_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1.1/admin/switchover"))
        .respond_with(xml(200, "<response/>".to_string()))
        .mount(&server)
        .await;

    let session = connect(&server).await;
    let err = session.switchover().await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus(ref e) if e.status == 200));
}

#[tokio::test]
async fn test_reboot_returns_link() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1.1/admin/reboot"))
        .respond_with(xml(
            202,
            responses::link("https://sbc/rest/v1.1/admin/asyncstatus"),
        ))
        .mount(&server)
        .await;

    let session = connect(&server).await;
    let link = session.reboot().await.unwrap();
    assert_eq!(link, "https://sbc/rest/v1.1/admin/asyncstatus");
}

#[tokio::test]
async fn test_reboot_without_link() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1.1/admin/reboot"))
        .respond_with(xml(200, "<response><data/></response>".to_string()))
        .mount(&server)
        .await;

    let session = connect(&server).await;
    let result = session.reboot().await;
    assert!(matches!(result, Err(Error::Parse(_))));
}

#[tokio::test]
async fn test_api_version_is_configurable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1.0/auth/token"))
        .respond_with(xml(200, responses::token(TOKEN)))
        .expect(1)
        .mount(&server)
        .await;

    let config = mock_config(&server)
        .with_api_version(sbc_core::ApiVersion::new("v1.0").unwrap());
    DeviceSession::connect(config, credentials()).await.unwrap();
}
