pub mod cursor;
pub mod fetch;
pub mod monitor;
pub mod notify;
pub mod recording;
pub mod review;
pub mod validate;

pub use cursor::TimeCursor;
pub use fetch::{FetchError, ReviewApi};
pub use monitor::{CycleError, CycleOutcome, Monitor, DEFAULT_POLL_INTERVAL, FAILURE_PREFIX};
pub use notify::{FailureDelivery, MessageChannel, Notifier, NotifyError};
pub use recording::{Direction, EventType, RecordedEvent, Sanitizer, ServiceType, CORRELATION_ID_HEADER};
pub use review::{InterpretationError, ReviewItem, ReviewStatus, StatusCatalog};
pub use validate::{validate, ValidatedResponse, ValidationError};

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Short build identifier: git hash from the deployment environment, else
/// the hash `built` detected at compile time, else the package version.
pub fn version() -> String {
    let hash = option_env!("HOMEWORK_GIT_HASH").or(built_info::GIT_COMMIT_HASH);
    match hash {
        Some(hash) if hash.len() >= 8 => hash[..8].to_string(),
        Some(hash) => hash.to_string(),
        None => built_info::PKG_VERSION.to_string(),
    }
}
