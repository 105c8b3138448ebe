//! The request executor: one authenticated JSON exchange with the service.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

use super::error::{PromptError, TransportError};
use crate::core::logging::redact_headers;

/// One request to the remote service, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub path: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl ApiRequest {
    /// A `POST` request carrying `body` as JSON.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            path: path.into(),
            method: Method::POST,
            headers: Vec::new(),
            body,
        }
    }

    /// Adds a header; it replaces a default header of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Performs request/response exchanges. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the decoded JSON body of a success response.
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

/// The reqwest-backed transport used outside of tests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl HttpTransport {
    /// Builds a client for `base_url`. `timeout` bounds each whole request.
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, PromptError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PromptError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            secret_key: secret_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let url = self.url(&request.path);
        let auth = format!("Bearer {}", self.secret_key);

        let mut headers: Vec<(&str, &str)> = vec![
            ("Accept", "application/json"),
            ("Content-Type", "application/json"),
            ("Authorization", auth.as_str()),
        ];
        for (k, v) in &request.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(k));
            headers.push((k.as_str(), v.as_str()));
        }

        tracing::debug!(
            %url,
            method = %request.method,
            headers = ?redact_headers(headers.iter().copied()),
            body = %request.body,
            "Making API request"
        );

        let mut builder = self.client.request(request.method.clone(), &url);
        for (k, v) in &headers {
            builder = builder.header(*k, *v);
        }

        let response = builder.json(&request.body).send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "Fetch error");
            TransportError::Network(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::debug!(%url, error = %e, "Failed to read error response body");
                String::new()
            });
            tracing::error!(%url, status = status.as_u16(), "Request rejected by service");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(TransportError::Network)?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    type Responder = Box<dyn Fn(&ApiRequest) -> Result<Value, TransportError> + Send + Sync>;

    /// Records every request and answers through a per-path responder.
    pub struct MockTransport {
        responders: HashMap<String, Responder>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                responders: HashMap::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn on<F>(mut self, path: &str, responder: F) -> Self
        where
            F: Fn(&ApiRequest) -> Result<Value, TransportError> + Send + Sync + 'static,
        {
            self.responders.insert(path.to_string(), Box::new(responder));
            self
        }

        /// Answers `/run` with `{response: "<promptId>-<action>"}`.
        pub fn echo_run() -> Self {
            Self::new().on("/run", |req| {
                let prompt = req.body["promptId"].as_str().unwrap_or_default();
                let action = req.body["action"].as_str().unwrap_or_default();
                Ok(serde_json::json!({ "response": format!("{}-{}", prompt, action) }))
            })
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn bodies_for(&self, path: &str) -> Vec<Value> {
            self.requests()
                .into_iter()
                .filter(|r| r.path == path)
                .map(|r| r.body)
                .collect()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.responders.get(&request.path) {
                Some(responder) => responder(&request),
                None => Err(TransportError::Status {
                    status: 404,
                    body: format!("No mock response for {}", request.path),
                }),
            }
        }
    }
}
