//! Shape checks on the decoded review API payload.
//!
//! The fetcher hands back an untyped `serde_json::Value`; nothing downstream
//! sees it until [`validate`] has turned it into [`ReviewItem`]s.

use serde_json::Value;
use thiserror::Error;

use crate::cursor::TimeCursor;
use crate::review::ReviewItem;

/// Field holding the list of review items.
pub const ITEMS_FIELD: &str = "homeworks";
/// Field holding the server's cursor for the next poll window.
pub const CURSOR_FIELD: &str = "current_date";
/// Item name key used by the production API.
pub const ITEM_NAME_FIELD: &str = "homework_name";
/// Fallback item name key.
pub const ITEM_NAME_FALLBACK_FIELD: &str = "name";
pub const ITEM_STATUS_FIELD: &str = "status";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ответ API не является объектом")]
    NotAnObject,

    #[error("в ответе API нет списка `homeworks` или он повреждён")]
    MissingItems,

    #[error("работа №{index} в ответе API повреждена: {reason}")]
    MalformedItem { index: usize, reason: String },

    #[error("поле `current_date` в ответе API не является целым числом")]
    MalformedCursor,
}

/// Review items from one poll, plus the cursor to poll from next time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedResponse {
    pub items: Vec<ReviewItem>,
    pub next_cursor: TimeCursor,
}

/// Validate a review API payload.
///
/// An empty items list is a normal outcome (nothing changed), not an error.
/// Any malformed item fails the whole call; there is no partial success.
pub fn validate(payload: &Value, cursor: TimeCursor) -> Result<ValidatedResponse, ValidationError> {
    let object = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    let raw_items = object
        .get(ITEMS_FIELD)
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingItems)?;

    let items = raw_items
        .iter()
        .enumerate()
        .map(|(index, raw)| validate_item(index, raw))
        .collect::<Result<Vec<_>, _>>()?;

    let next_cursor = match object.get(CURSOR_FIELD) {
        None | Some(Value::Null) => cursor,
        Some(value) => value
            .as_i64()
            .map(TimeCursor::new)
            .ok_or(ValidationError::MalformedCursor)?,
    };

    Ok(ValidatedResponse { items, next_cursor })
}

fn validate_item(index: usize, raw: &Value) -> Result<ReviewItem, ValidationError> {
    let malformed = |reason: &str| ValidationError::MalformedItem {
        index,
        reason: reason.to_string(),
    };

    let object = raw.as_object().ok_or_else(|| malformed("запись не является объектом"))?;

    let name = object
        .get(ITEM_NAME_FIELD)
        .filter(|v| !v.is_null())
        .or_else(|| object.get(ITEM_NAME_FALLBACK_FIELD))
        .ok_or_else(|| malformed("нет названия работы"))?
        .as_str()
        .ok_or_else(|| malformed("название работы не является строкой"))?;

    if name.trim().is_empty() {
        return Err(malformed("пустое название работы"));
    }

    let status = object
        .get(ITEM_STATUS_FIELD)
        .ok_or_else(|| malformed("нет статуса"))?
        .as_str()
        .ok_or_else(|| malformed("статус не является строкой"))?;

    Ok(ReviewItem::new(name, status))
}
