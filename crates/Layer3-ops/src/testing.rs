//! Test doubles shared by the ops unit tests

use async_trait::async_trait;
use fab_client::{AccessToken, ApiClient, ApiRequest, ApiResponse, ApiTransport, ClientError, Method};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Sentinel status that makes the mock simulate a transport-level failure
/// instead of returning an HTTP response.
pub(crate) const TRANSPORT_FAILURE: u16 = 0;

struct Route {
    method: Method,
    path: String,
    queue: VecDeque<(u16, Value)>,
}

/// Scripted transport. Responses are queued per (method, path-substring)
/// and consumed in order; the last queued response is sticky.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<(Method, String)>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) {
        let mut routes = self.routes.lock().unwrap();
        if let Some(route) = routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            route.queue.push_back((status, body));
        } else {
            routes.push(Route {
                method,
                path: path.to_string(),
                queue: VecDeque::from([(status, body)]),
            });
        }
    }

    /// URLs of every request seen, in order.
    pub fn calls(&self) -> Vec<(Method, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests matching a method and URL substring.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, url)| *m == method && url.contains(path))
            .count()
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.method, request.url.clone()));

        let mut routes = self.routes.lock().unwrap();
        // Longest matching substring wins, so a nested-path route takes
        // precedence over its container's route.
        let route = routes
            .iter_mut()
            .filter(|r| r.method == request.method && request.url.contains(&r.path))
            .max_by_key(|r| r.path.len());

        let (status, body) = match route {
            Some(route) if route.queue.len() > 1 => route.queue.pop_front().unwrap(),
            Some(route) => route.queue.front().cloned().unwrap_or((404, Value::Null)),
            None => (404, Value::Null),
        };

        if status == TRANSPORT_FAILURE {
            return Err(ClientError::RequestFailed(
                "simulated transport failure".to_string(),
            ));
        }

        let text = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        Ok(ApiResponse { status, body, text })
    }
}

/// Build an `ApiClient` over the mock with a throwaway token.
pub(crate) fn mock_client(transport: &Arc<MockTransport>, base_url: &str) -> ApiClient {
    ApiClient::new(
        transport.clone() as Arc<dyn ApiTransport>,
        base_url,
        AccessToken::new("test-audience", "test-token"),
    )
}
