use reqwest::{Client, Method, Response};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::DbInteractConfig;
use service_core::error::AppError;

/// HTTP client for the downstream db-interact service.
///
/// The caller's bearer token is forwarded on every request; db-interact
/// performs its own authorization against it. Transport failures are mapped
/// to client-visible errors here, while non-2xx downstream statuses are
/// returned as-is for the handlers to relay.
pub struct DbInteractClient {
    client: Client,
    base_url: String,
}

impl DbInteractClient {
    pub fn new(config: &DbInteractConfig) -> Result<Self, AppError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a child record: `POST /internal/children`.
    pub async fn create_child(&self, child: &Value, token: &str) -> Result<Response, AppError> {
        self.request(Method::POST, "/internal/children", token, Some(child))
            .await
    }

    /// Attach a supervisor to a child: `PUT /internal/children/{id}/link-supervisor`.
    pub async fn link_supervisor(
        &self,
        child_id: &str,
        supervisor_id: &str,
        token: &str,
    ) -> Result<Response, AppError> {
        let path = format!("/internal/children/{}/link-supervisor", child_id);
        let payload = json!({ "supervisor_id": supervisor_id });
        self.request(Method::PUT, &path, token, Some(&payload)).await
    }

    /// Fetch one child: `GET /data/children/{id}`. Also serves as the
    /// authorization check before updates.
    pub async fn get_child(&self, child_id: &str, token: &str) -> Result<Response, AppError> {
        let path = format!("/data/children/{}", child_id);
        self.request(Method::GET, &path, token, None).await
    }

    /// List children visible to the caller: `GET /data/children`.
    pub async fn list_children(&self, token: &str) -> Result<Response, AppError> {
        self.request(Method::GET, "/data/children", token, None)
            .await
    }

    /// Update editable child fields: `PUT /internal/children/{id}`.
    pub async fn update_child(
        &self,
        child_id: &str,
        update: &Value,
        token: &str,
    ) -> Result<Response, AppError> {
        let path = format!("/internal/children/{}", child_id);
        self.request(Method::PUT, &path, token, Some(update)).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Result<Response, AppError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.request(method.clone(), &url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::error!("db-interact request to {} timed out: {}", url, e);
                AppError::ServiceUnavailable
            } else if e.is_connect() {
                tracing::error!("db-interact connection error for {}: {}", url, e);
                AppError::ServiceUnavailable
            } else {
                tracing::error!("db-interact request error for {}: {}", url, e);
                AppError::BadGateway(format!("db-interact request failed: {}", e))
            }
        })?;

        tracing::info!(
            "db-interact {} {} -> {}",
            method,
            url,
            response.status().as_u16()
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let client = DbInteractClient::new(&DbInteractConfig {
            url: "http://db-interact:8082/".to_string(),
            timeout_seconds: 10,
        })
        .expect("Failed to build client");

        assert_eq!(client.base_url, "http://db-interact:8082");
    }
}
