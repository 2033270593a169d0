//! Mock gateway for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::gateway::{Gateway, GatewayError};

/// A recorded GET for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

/// Mock implementation of the Gateway trait.
///
/// Routes are matched on the exact path, ignoring query parameters.
/// Unrouted paths answer like a missing upstream resource (404).
#[derive(Debug, Default)]
pub struct MockGateway {
    routes: Arc<RwLock<HashMap<String, Result<Value, GatewayError>>>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    next_error: Arc<RwLock<Option<GatewayError>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with `body`.
    pub async fn respond(&self, path: &str, body: Value) {
        self.routes.write().await.insert(path.to_string(), Ok(body));
    }

    /// Fail every request to `path` with `error`.
    pub async fn fail(&self, path: &str, error: GatewayError) {
        self.routes.write().await.insert(path.to_string(), Err(error));
    }

    /// Fail the next request, whatever its path.
    pub async fn set_next_error(&self, error: GatewayError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    /// Requests issued to exactly `path`.
    pub async fn requests_for(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    /// Number of requests whose path starts with `prefix`.
    pub async fn count_prefix(&self, prefix: &str) -> usize {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, GatewayError> {
        self.requests.write().await.push(RecordedRequest {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        match self.routes.read().await.get(path) {
            Some(response) => response.clone(),
            None => Err(GatewayError::status(404, "HTTP Error: 404 Not Found")),
        }
    }
}
