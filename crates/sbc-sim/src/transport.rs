//! Scripted in-memory transport.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, trace};

use sbc_core::error::TransportError;
use sbc_core::{HttpRequest, HttpResponse, Method, Transport};

/// A request as the transport received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub authorization: Option<String>,
    pub body: Option<String>,
}

/// One scripted outcome.
#[derive(Clone, Debug)]
enum Reply {
    Response(HttpResponse),
    Fail(String),
}

#[derive(Debug)]
struct Route {
    method: Method,
    url_fragment: String,
    replies: VecDeque<Reply>,
}

/// A [`Transport`] that answers from a script.
///
/// Routes match on the verb and a substring of the URL; the first matching
/// route wins. Each route replays its replies in order and keeps repeating
/// the last one. Requests without a route get a 404.
///
/// # Example
///
/// ```
/// use sbc_core::{HttpResponse, Method};
/// use sbc_sim::{ScriptedTransport, responses};
///
/// let device = ScriptedTransport::new();
/// device
///     .respond(Method::Post, "auth/token", responses::ok(responses::token("abc")))
///     .respond(Method::Post, "configuration/lock", HttpResponse::new(204, "No Content", ""))
///     .respond(Method::Post, "configuration/lock", HttpResponse::new(409, "Conflict", ""));
/// ```
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for requests matching `method` and `url_fragment`.
    pub fn respond(
        &self,
        method: Method,
        url_fragment: impl Into<String>,
        response: HttpResponse,
    ) -> &Self {
        self.push(method, url_fragment.into(), Reply::Response(response));
        self
    }

    /// Queue a transport failure for matching requests.
    pub fn fail(
        &self,
        method: Method,
        url_fragment: impl Into<String>,
        message: impl Into<String>,
    ) -> &Self {
        self.push(method, url_fragment.into(), Reply::Fail(message.into()));
        self
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of requests received with this verb and URL substring.
    pub fn count(&self, method: Method, url_fragment: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.method == method && c.url.contains(url_fragment))
            .count()
    }

    fn push(&self, method: Method, url_fragment: String, reply: Reply) {
        let mut routes = lock(&self.routes);
        match routes
            .iter_mut()
            .find(|r| r.method == method && r.url_fragment == url_fragment)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                url_fragment,
                replies: VecDeque::from([reply]),
            }),
        }
    }

    fn next_reply(&self, method: Method, url: &str) -> Option<Reply> {
        let mut routes = lock(&self.routes);
        let route = routes
            .iter_mut()
            .find(|r| r.method == method && url.contains(&r.url_fragment))?;

        if route.replies.len() > 1 {
            route.replies.pop_front()
        } else {
            route.replies.front().cloned()
        }
    }
}

// A panicking test must not hide the calls recorded before it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        trace!(method = %request.method, url = %request.url, "Scripted request");

        lock(&self.calls).push(RecordedCall {
            method: request.method,
            url: request.url.clone(),
            authorization: request.header_value("Authorization").map(str::to_string),
            body: request.body.clone(),
        });

        match self.next_reply(request.method, &request.url) {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(TransportError::Connection { message }),
            None => {
                debug!(method = %request.method, url = %request.url, "No scripted route");
                Ok(HttpResponse::new(404, "Not Found", ""))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn get(url: &str) -> HttpRequest {
        HttpRequest::new(Method::Get, url, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn replays_in_order_then_repeats_last() {
        let transport = ScriptedTransport::new();
        transport
            .respond(Method::Get, "/status", HttpResponse::new(200, "OK", "first"))
            .respond(Method::Get, "/status", HttpResponse::new(200, "OK", "second"));

        let bodies = send_n(&transport, "https://sbc/status", 3).await;
        assert_eq!(bodies, vec!["first", "second", "second"]);
        assert_eq!(transport.count(Method::Get, "/status"), 3);
    }

    #[tokio::test]
    async fn unmatched_requests_get_404() {
        let transport = ScriptedTransport::new();
        let response = transport.send(get("https://sbc/unknown")).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn scripted_failures() {
        let transport = ScriptedTransport::new();
        transport.fail(Method::Get, "/down", "connection refused");
        let err = transport.send(get("https://sbc/down")).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection { .. }));
    }

    #[tokio::test]
    async fn records_authorization_and_body() {
        let transport = ScriptedTransport::new();
        let request =
            HttpRequest::new(Method::Put, "https://sbc/elements", Duration::from_secs(1))
                .header("Authorization", "Bearer t")
                .body("<x/>");
        transport.send(request).await.unwrap();

        let call = &transport.calls()[0];
        assert_eq!(call.authorization.as_deref(), Some("Bearer t"));
        assert_eq!(call.body.as_deref(), Some("<x/>"));
    }

    async fn send_n(transport: &ScriptedTransport, url: &str, n: usize) -> Vec<String> {
        let mut bodies = Vec::new();
        for _ in 0..n {
            bodies.push(transport.send(get(url)).await.unwrap().body);
        }
        bodies
    }
}
