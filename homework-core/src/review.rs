use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One submitted homework's current review record.
///
/// Produced by the validator; `name` is guaranteed non-empty there, but
/// `status` is kept as the raw code so the interpreter can report codes it
/// does not recognise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub name: String,
    pub status: String,
}

impl ReviewItem {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }
}

/// Review status codes the API documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 3] = [
        ReviewStatus::Approved,
        ReviewStatus::Reviewing,
        ReviewStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Approved => "approved",
            ReviewStatus::Reviewing => "reviewing",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(ReviewStatus::Approved),
            "reviewing" => Ok(ReviewStatus::Reviewing),
            "rejected" => Ok(ReviewStatus::Rejected),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretationError {
    #[error("недокументированный статус {status:?} у работы {name:?}")]
    UnknownStatus { name: String, status: String },
}

/// Verdict text for each review status. Fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCatalog {
    approved: String,
    reviewing: String,
    rejected: String,
}

impl Default for StatusCatalog {
    fn default() -> Self {
        Self {
            approved: "Работа проверена: ревьюеру всё понравилось. Ура!".to_string(),
            reviewing: "Работа взята на проверку ревьюером.".to_string(),
            rejected: "Работа проверена: у ревьюера есть замечания.".to_string(),
        }
    }
}

impl StatusCatalog {
    pub fn verdict(&self, status: ReviewStatus) -> &str {
        match status {
            ReviewStatus::Approved => &self.approved,
            ReviewStatus::Reviewing => &self.reviewing,
            ReviewStatus::Rejected => &self.rejected,
        }
    }

    /// Render the notification for a status change of `item`.
    ///
    /// Unknown status codes are an error rather than being skipped: they
    /// usually mean the API contract changed underneath us.
    pub fn interpret(&self, item: &ReviewItem) -> Result<String, InterpretationError> {
        let status = item.status.parse::<ReviewStatus>().map_err(|_| {
            InterpretationError::UnknownStatus {
                name: item.name.clone(),
                status: item.status.clone(),
            }
        })?;

        Ok(format_status_change(&item.name, self.verdict(status)))
    }
}

/// Single-line notification text naming the homework and its verdict.
pub fn format_status_change(name: &str, verdict: &str) -> String {
    // Names come from the API; keep the message on one line regardless.
    let name = name.replace(['\n', '\r'], " ");
    format!("Изменился статус проверки работы \"{}\". {}", name, verdict)
}
