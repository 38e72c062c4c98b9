//! Scriptable mock gateway for testing the sync core.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use syntra_core::{ApiError, ApiGateway, ApiResult, GatewayResult, ServiceHealth};

/// One call recorded by the mock, in issue order.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// HTTP method ("GET", "POST", "PUT").
    pub method: String,
    /// Request path including any query string.
    pub path: String,
    /// JSON body, if one was sent.
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    queued: HashMap<String, VecDeque<GatewayResult>>,
    sticky: HashMap<String, GatewayResult>,
    calls: Vec<RecordedCall>,
}

/// In-memory [`ApiGateway`] with scripted responses and call recording.
///
/// Responses registered with [`expect`] are consumed once in FIFO order;
/// [`stick`] registers a fallback returned whenever the queue for a route is
/// empty. Unscripted routes answer with a 404 [`ApiError`] so tests fail
/// loudly on unexpected traffic.
///
/// [`expect`]: MockGateway::expect
/// [`stick`]: MockGateway::stick
#[derive(Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    /// Creates an empty mock gateway.
    pub fn new() -> Self {
        Self::default()
    }

    fn route(method: &str, path: &str) -> String {
        format!("{method} {path}")
    }

    /// Queues one response for a route.
    pub fn expect(&self, method: &str, path: &str, result: GatewayResult) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state
            .queued
            .entry(Self::route(method, path))
            .or_default()
            .push_back(result);
    }

    /// Registers a fallback response replayed whenever the route's queue is
    /// empty.
    pub fn stick(&self, method: &str, path: &str, result: GatewayResult) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.sticky.insert(Self::route(method, path), result);
    }

    /// Returns all recorded calls in issue order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().expect("mock state poisoned").calls.clone()
    }

    /// Returns the total number of recorded calls.
    pub fn request_count(&self) -> usize {
        self.state.lock().expect("mock state poisoned").calls.len()
    }

    /// Counts recorded calls with the given method and path prefix.
    pub fn count_matching(&self, method: &str, path_prefix: &str) -> usize {
        self.state
            .lock()
            .expect("mock state poisoned")
            .calls
            .iter()
            .filter(|call| call.method == method && call.path.starts_with(path_prefix))
            .count()
    }

    fn dispatch(&self, method: &str, path: &str, body: Option<Value>) -> GatewayResult {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.calls.push(RecordedCall {
            method: method.to_string(),
            path: path.to_string(),
            body,
        });

        let route = Self::route(method, path);
        if let Some(result) = state.queued.get_mut(&route).and_then(VecDeque::pop_front) {
            return result;
        }
        if let Some(result) = state.sticky.get(&route) {
            return result.clone();
        }
        Err(ApiError::http(
            404,
            format!("no mock response registered for {route}"),
        ))
    }
}

#[async_trait::async_trait]
impl ApiGateway for MockGateway {
    async fn get(&self, path: &str) -> GatewayResult {
        self.dispatch("GET", path, None)
    }

    async fn post(&self, path: &str, body: Option<Value>) -> GatewayResult {
        self.dispatch("POST", path, body)
    }

    async fn put(&self, path: &str, body: Value) -> GatewayResult {
        self.dispatch("PUT", path, Some(body))
    }

    async fn health_check(&self) -> ApiResult<ServiceHealth> {
        Ok(ServiceHealth::healthy())
    }
}
