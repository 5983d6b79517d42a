//! Types shared by the HTTP exchange recorder.
//!
//! The recorder itself lives in the binary crate, next to the HTTP clients;
//! this module only defines what a recorded event looks like and how
//! secrets are scrubbed from it.

pub mod sanitizer;
pub mod types;

pub use sanitizer::{Sanitizer, REDACTED, SENSITIVE_HEADERS};
pub use types::*;
