use async_trait::async_trait;
use homework_core::{MessageChannel, NotifyError};
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};

use crate::transport::{describe_reqwest_error, describe_transport_error};

/// Telegram's limit on message length, in characters.
pub const TELEGRAM_MESSAGE_MAX_CHARS: usize = 4096;

/// Sends notifications to a single Telegram chat through the Bot API.
#[derive(Clone)]
pub struct TelegramChannel {
    client: ClientWithMiddleware,
    api_base: String,
    token: String,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramChannel {
    pub fn new(
        client: ClientWithMiddleware,
        api_base: &str,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }
}

/// Truncate to Telegram's length limit, marking the cut with an ellipsis.
pub fn truncate_message(text: &str) -> String {
    if text.chars().count() <= TELEGRAM_MESSAGE_MAX_CHARS {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(TELEGRAM_MESSAGE_MAX_CHARS - 1).collect();
    truncated.push('…');
    truncated
}

#[async_trait]
impl MessageChannel for TelegramChannel {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let text = truncate_message(text);
        let body = serde_json::to_string(&SendMessageRequest {
            chat_id: &self.chat_id,
            text: &text,
        })
        .map_err(|e| NotifyError::Rejected(e.to_string()))?;

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| NotifyError::Network(describe_transport_error(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NotifyError::Network(describe_reqwest_error(&e)))?;

        // The Bot API reports failures as {"ok": false, "description": ...},
        // usually with a non-2xx status as well.
        match serde_json::from_str::<BotApiResponse>(&body) {
            Ok(reply) if reply.ok && status.is_success() => Ok(()),
            Ok(reply) => Err(NotifyError::Rejected(
                reply
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            )),
            Err(_) => Err(NotifyError::Rejected(format!(
                "HTTP {} with unreadable body",
                status.as_u16()
            ))),
        }
    }
}
