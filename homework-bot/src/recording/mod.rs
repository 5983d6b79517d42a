//! Opt-in recording of outbound HTTP exchanges as JSON lines.

pub mod logger;
pub mod middleware;

pub use homework_core::recording::*;
pub use logger::RecordingLogger;
pub use middleware::RecordingMiddleware;
