use std::error::Error as _;
use std::time::Duration;

use anyhow::{Context, Result};
use homework_core::ServiceType;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

use crate::recording::{RecordingLogger, RecordingMiddleware};

/// Build the HTTP client for one outbound service.
///
/// `timeout` bounds each whole request; the monitor itself imposes none.
pub fn create_http_client(
    service: ServiceType,
    timeout: Duration,
    recording_logger: Option<RecordingLogger>,
) -> Result<ClientWithMiddleware> {
    let client = Client::builder()
        .user_agent(format!("homework-bot/{}", homework_core::version()))
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let mut builder = ClientBuilder::new(client);

    if let Some(logger) = recording_logger {
        builder = builder.with(RecordingMiddleware::new(logger, service));
    }

    Ok(builder.build())
}

/// Describe a transport failure without the request URL.
///
/// The Telegram URL carries the bot token, and the review API URL carries the
/// cursor, which would make otherwise identical failures look different.
pub fn describe_transport_error(err: &reqwest_middleware::Error) -> String {
    match err {
        reqwest_middleware::Error::Reqwest(e) => describe_reqwest_error(e),
        reqwest_middleware::Error::Middleware(e) => format!("{:#}", e),
    }
}

pub fn describe_reqwest_error(err: &reqwest::Error) -> String {
    let mut message = if err.is_timeout() {
        "истекло время ожидания ответа"
    } else if err.is_connect() {
        "не удалось установить соединение"
    } else if err.is_body() || err.is_decode() {
        "не удалось прочитать ответ"
    } else {
        "ошибка запроса"
    }
    .to_string();

    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }

    message
}
