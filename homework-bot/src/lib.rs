pub mod config;
pub mod logging;
pub mod practicum;
pub mod recording;
pub mod telegram;
pub mod transport;

pub use config::{Config, ConfigError};
pub use practicum::PracticumClient;
pub use recording::RecordingLogger;
pub use telegram::TelegramChannel;
