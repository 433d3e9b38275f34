use async_trait::async_trait;
use recordmap::{Arguments, RemoteError, RemoteOperations};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::common::{ApiParams, ApiResponse, AUTH_FAILED_CODE};
use super::error::ApiError;

pub const DEFAULT_ENDPOINT: &str = "https://api.linode.com/";

/// Whether a failed attempt of `action` may be sent again after the service
/// might already have processed it. Actions that create resources may not.
pub fn is_replay_safe(action: &str) -> bool {
    !(action.ends_with(".create") || action.ends_with(".duplicate"))
}

/// Linode API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    retry_config: RetryConfig,
}

#[derive(Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(endpoint: &str, api_key: &str, insecure: bool) -> Result<Self, ApiError> {
        Self::with_config(endpoint, api_key, insecure, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        endpoint: &str,
        api_key: &str,
        insecure: bool,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .timeout(Duration::from_secs(retry_config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                endpoint: endpoint.to_string(),
                api_key: api_key.to_string(),
                retry_config,
            }),
        })
    }

    pub fn from_config(config: &crate::Config) -> Result<Self, ApiError> {
        Self::new(config.endpoint.as_str(), &config.api_key, config.insecure)
    }

    /// Invoke an API action and return its DATA section
    pub async fn call_action(&self, action: &str, arguments: &Arguments) -> Result<Value, ApiError> {
        let params = ApiParams::new()
            .add("api_key", &self.inner.api_key)
            .add("api_action", action)
            .add("api_responseFormat", "json")
            .extend_arguments(arguments);

        tracing::debug!("POST {} with {}", self.inner.endpoint, params.redacted());

        let http_client = &self.inner.http_client;
        let endpoint = self.inner.endpoint.as_str();
        let form = params.as_form();

        self.execute_with_retry(
            || async move { http_client.post(endpoint).form(form).send().await },
            action,
        )
        .await
    }

    /// Execute request with retry logic
    async fn execute_with_retry<F, Fut>(&self, request_fn: F, action: &str) -> Result<Value, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        let mut last_error = None;
        let replay_safe = is_replay_safe(action);

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    self.inner.retry_config.initial_backoff_ms * (2_u64.pow(attempt - 1)),
                    self.inner.retry_config.max_backoff_ms,
                );
                tracing::warn!(
                    "Retrying {} after {}ms (attempt {})",
                    action,
                    backoff,
                    attempt
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(backoff)).await;
            }

            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return self.parse_success_response(response, action).await;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::AuthError);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        if !replay_safe {
                            tracing::warn!("{} failed with HTTP {}, not retrying", action, status);
                            return Err(ApiError::ServiceUnavailable);
                        }
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(self.handle_error_response(response).await);
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        let timeout = ApiError::Timeout(self.inner.retry_config.timeout_seconds);
                        if !replay_safe {
                            return Err(timeout);
                        }
                        last_error = Some(timeout);
                    } else if e.is_connect() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    /// Unwrap the response envelope, turning a non-empty ERRORARRAY into an error
    async fn parse_success_response(
        &self,
        response: reqwest::Response,
        action: &str,
    ) -> Result<Value, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        let envelope = serde_json::from_str::<ApiResponse>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(e.to_string())
        })?;

        if envelope.errors.is_empty() {
            return Ok(envelope.data);
        }

        if envelope.errors.iter().any(|e| e.code == AUTH_FAILED_CODE) {
            return Err(ApiError::AuthError);
        }

        let action = if envelope.action.is_empty() {
            action.to_string()
        } else {
            envelope.action
        };

        Err(ApiError::ApiError {
            action,
            errors: envelope.errors,
        })
    }

    async fn handle_error_response(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        ApiError::HttpError { status, message }
    }
}

#[async_trait]
impl RemoteOperations for Client {
    async fn call(&self, operation: &str, arguments: Arguments) -> Result<Value, RemoteError> {
        self.call_action(operation, &arguments)
            .await
            .map_err(RemoteError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::{create_test_client, fast_retry_client};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn arguments(value: Value) -> Arguments {
        match value {
            Value::Object(map) => map,
            _ => Arguments::new(),
        }
    }

    #[tokio::test]
    async fn client_sends_action_key_and_arguments() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
                Matcher::UrlEncoded("api_action".into(), "linode.list".into()),
                Matcher::UrlEncoded("LinodeID".into(), "42".into()),
            ]))
            .with_body(
                r#"{"ERRORARRAY":[],"ACTION":"linode.list","DATA":[{"LINODEID":42,"LABEL":"web1"}]}"#,
            )
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let data = client
            .call_action("linode.list", &arguments(json!({"LinodeID": 42})))
            .await
            .unwrap();

        assert_eq!(data, json!([{"LINODEID": 42, "LABEL": "web1"}]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_maps_error_array() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(
                r#"{"ERRORARRAY":[{"ERRORCODE":8,"ERRORMESSAGE":"A required property is missing: PlanID"}],"ACTION":"linode.create","DATA":{}}"#,
            )
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let result = client.call_action("linode.create", &Arguments::new()).await;

        match result {
            Err(ApiError::ApiError { action, errors }) => {
                assert_eq!(action, "linode.create");
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].code, 8);
                assert!(errors[0].message.contains("PlanID"));
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn client_handles_authentication_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(
                r#"{"ERRORARRAY":[{"ERRORCODE":4,"ERRORMESSAGE":"Authentication failed"}],"ACTION":"linode.list","DATA":{}}"#,
            )
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let result = client.call_action("linode.list", &Arguments::new()).await;
        assert!(matches!(result, Err(ApiError::AuthError)));
    }

    #[tokio::test]
    async fn client_reports_unparseable_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let result = client.call_action("avail.kernels", &Arguments::new()).await;
        assert!(matches!(result, Err(ApiError::ParseError(_))));
    }

    #[tokio::test]
    async fn client_does_not_retry_client_errors() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(400)
            .with_body("bad request")
            .expect(1)
            .create_async()
            .await;

        let client = fast_retry_client(&server.url());
        let result = client.call_action("linode.list", &Arguments::new()).await;

        assert!(matches!(result, Err(ApiError::HttpError { status: 400, .. })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_retries_server_errors() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client = fast_retry_client(&server.url());
        let result = client.call_action("linode.list", &Arguments::new()).await;

        assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_does_not_replay_create_after_server_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::UrlEncoded("api_action".into(), "linode.create".into()))
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let client = fast_retry_client(&server.url());
        let result = client.call_action("linode.create", &Arguments::new()).await;

        assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_retries_create_when_rate_limited() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(429)
            .expect(3)
            .create_async()
            .await;

        let client = fast_retry_client(&server.url());
        let result = client.call_action("linode.disk.create", &Arguments::new()).await;

        assert!(matches!(result, Err(ApiError::RateLimited)));
        mock.assert_async().await;
    }

    #[test]
    fn replay_safety_by_action() {
        assert!(is_replay_safe("linode.list"));
        assert!(is_replay_safe("linode.boot"));
        assert!(is_replay_safe("linode.disk.resize"));
        assert!(!is_replay_safe("linode.create"));
        assert!(!is_replay_safe("linode.config.create"));
        assert!(!is_replay_safe("linode.disk.duplicate"));
    }

    #[tokio::test]
    async fn client_handles_network_errors() {
        let client = fast_retry_client("http://127.0.0.1:1");
        let result = client.call_action("linode.list", &Arguments::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn remote_operations_boxes_api_errors() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(
                r#"{"ERRORARRAY":[{"ERRORCODE":5,"ERRORMESSAGE":"Object not found"}],"ACTION":"linode.boot","DATA":{}}"#,
            )
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let error = RemoteOperations::call(&client, "linode.boot", Arguments::new())
            .await
            .unwrap_err();

        let api_error = error.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api_error.codes(), vec![5]);
        assert!(error.to_string().contains("Object not found"));
    }
}
