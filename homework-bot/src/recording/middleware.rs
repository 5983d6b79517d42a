use super::logger::RecordingLogger;
use homework_core::{Direction, RecordedEvent, Sanitizer, ServiceType, CORRELATION_ID_HEADER};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result as MiddlewareResult};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Bodies larger than this are summarised instead of recorded.
const MAX_RECORDED_BODY: usize = 10_000;

pub struct RecordingMiddleware {
    logger: RecordingLogger,
    service_type: ServiceType,
}

impl RecordingMiddleware {
    pub fn new(logger: RecordingLogger, service_type: ServiceType) -> Self {
        Self {
            logger,
            service_type,
        }
    }
}

#[async_trait::async_trait]
impl Middleware for RecordingMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> MiddlewareResult<Response> {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if !req.headers().contains_key(CORRELATION_ID_HEADER) {
            if let Ok(value) = correlation_id.parse::<reqwest::header::HeaderValue>() {
                req.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }
        }

        let request_data = extract_request_data(&req);
        self.record(
            Direction::Request,
            format!("{} {}", request_data.method, extract_path(&req)),
            &request_data,
            &correlation_id,
        );

        let response = next.run(req, extensions).await;

        match &response {
            Ok(resp) => {
                let response_data = extract_response_data(resp);
                self.record(
                    Direction::Response,
                    format!("response_{}", response_data.status_code),
                    &response_data,
                    &correlation_id,
                );
            }
            Err(err) => {
                let error_data = ErrorData {
                    error: crate::transport::describe_transport_error(err),
                };
                self.record(
                    Direction::Response,
                    "error".to_string(),
                    &error_data,
                    &correlation_id,
                );
            }
        }

        response
    }
}

impl RecordingMiddleware {
    fn record<T: Serialize>(
        &self,
        direction: Direction,
        operation: String,
        data: &T,
        correlation_id: &str,
    ) {
        let event = RecordedEvent {
            timestamp: chrono::Utc::now().to_rfc3339(),
            correlation_id: correlation_id.to_string(),
            event_type: self.service_type.event_type(),
            direction,
            operation,
            data: serde_json::to_value(data).unwrap_or(serde_json::Value::Null),
            metadata: HashMap::new(),
        };

        self.logger.record(event);
    }
}

fn header_map(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect();
    Sanitizer::sanitize_headers(&headers)
}

fn extract_request_data(request: &Request) -> RequestData {
    let body = match request.body() {
        None => serde_json::Value::Null,
        Some(body) => match body.as_bytes() {
            None => serde_json::Value::String("[STREAM_BODY]".to_string()),
            Some(bytes) if bytes.len() > MAX_RECORDED_BODY => {
                serde_json::Value::String(format!("[LARGE_BODY_{}b]", bytes.len()))
            }
            Some(bytes) => match serde_json::from_slice::<serde_json::Value>(bytes) {
                Ok(json) => Sanitizer::sanitize_json(&json),
                Err(_) => serde_json::Value::String(format!("[NON_JSON_BODY_{}b]", bytes.len())),
            },
        },
    };

    RequestData {
        method: request.method().to_string(),
        url: Sanitizer::sanitize_url(request.url().as_str()),
        headers: header_map(request.headers()),
        body,
    }
}

fn extract_response_data(response: &Response) -> ResponseData {
    ResponseData {
        status_code: response.status().as_u16(),
        headers: header_map(response.headers()),
        body_size: response.content_length(),
    }
}

fn extract_path(request: &Request) -> String {
    Sanitizer::sanitize_url(request.url().path())
}

#[derive(Debug, Serialize)]
struct RequestData {
    method: String,
    url: String,
    headers: HashMap<String, String>,
    body: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ResponseData {
    status_code: u16,
    headers: HashMap<String, String>,
    body_size: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ErrorData {
    error: String,
}
