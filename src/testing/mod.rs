use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::client::{ApiClient, ApiRequest, HttpMethod, Transport};
use crate::error::ClientError;

type Scripted = Result<Value, ClientError>;

/// Scripted transport for unit tests.
///
/// Responses are queued per (method, path); the last queued response for a
/// route is sticky so repeated fetches keep seeing it. Unscripted routes fail
/// with a 404. Every request is recorded.
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<(HttpMethod, String), VecDeque<Scripted>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a route (chainable)
    pub fn respond(self, method: HttpMethod, path: &str, response: Scripted) -> Self {
        self.push(method, path, response);
        self
    }

    pub fn push(&self, method: HttpMethod, path: &str, response: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(Arc::new(self.clone()))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let key = (request.method, request.path.clone());
        self.requests.lock().unwrap().push(request);

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if queue.len() == 1 => queue[0].clone(),
            _ => Err(ClientError::Rejected {
                status: 404,
                body: serde_json::json!({"detail": "Not found."}),
            }),
        }
    }
}
