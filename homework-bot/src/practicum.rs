use async_trait::async_trait;
use homework_core::{FetchError, ReviewApi, TimeCursor};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use tracing::{debug, error};

use crate::transport::{describe_reqwest_error, describe_transport_error};

/// Client for the homework review status API.
#[derive(Clone)]
pub struct PracticumClient {
    client: ClientWithMiddleware,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(client: ClientWithMiddleware, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl ReviewApi for PracticumClient {
    async fn fetch(&self, from: TimeCursor) -> Result<Value, FetchError> {
        debug!("Requesting homework statuses from_date={}", from);

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from.as_secs())])
            .send()
            .await
            .map_err(|e| {
                let message = describe_transport_error(&e);
                error!("Review API request failed: {}", message);
                FetchError::Network(message)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            // Body is only for the log; the failure is the status code.
            let body = response.text().await.unwrap_or_default();
            error!("Review API error: {} - {}", status, body);
            return Err(FetchError::ApiStatus {
                code: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| {
            let message = describe_reqwest_error(&e);
            error!("Failed to read review API response: {}", message);
            FetchError::Network(message)
        })?;

        serde_json::from_str(&body).map_err(|e| {
            error!("Review API returned invalid JSON: {}", e);
            FetchError::MalformedPayload(e.to_string())
        })
    }
}
