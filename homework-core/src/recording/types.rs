use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecordedEvent {
    pub timestamp: String,      // ISO 8601 timestamp
    pub correlation_id: String, // Groups a request with its response
    pub event_type: EventType,
    pub direction: Direction,
    pub operation: String,       // e.g. "GET /api/user_api/homework_statuses/", "response_200"
    pub data: serde_json::Value, // Sanitized request/response data
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum EventType {
    ReviewApiCall,
    TelegramApiCall,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Direction {
    Request,
    Response,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum ServiceType {
    ReviewApi,
    Telegram,
}

impl ServiceType {
    pub fn event_type(&self) -> EventType {
        match self {
            ServiceType::ReviewApi => EventType::ReviewApiCall,
            ServiceType::Telegram => EventType::TelegramApiCall,
        }
    }
}

// Header name for correlation ID propagation
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";
