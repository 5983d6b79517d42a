use anyhow::{Context, Result};
use homework_core::RecordedEvent;
use std::fs::{self, OpenOptions};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::error;

/// JSONL sink for recorded HTTP exchanges.
///
/// The file is opened up front so a bad `RECORDING_LOG_PATH` shows up at
/// startup rather than as a silent background failure. Writes happen on a
/// spawned task; clones share it. Must be created inside a Tokio runtime.
#[derive(Clone)]
pub struct RecordingLogger {
    sender: mpsc::UnboundedSender<RecordedEvent>,
}

impl RecordingLogger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening {}", path.display()))?;

        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(write_events(File::from_std(file), receiver));

        Ok(Self { sender })
    }

    /// Queue an event. Never blocks the caller.
    pub fn record(&self, event: RecordedEvent) {
        if self.sender.send(event).is_err() {
            error!("Recording writer has stopped; dropping event");
        }
    }
}

async fn write_events(mut file: File, mut receiver: mpsc::UnboundedReceiver<RecordedEvent>) {
    while let Some(event) = receiver.recv().await {
        let mut line = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize recorded event: {}", e);
                continue;
            }
        };
        line.push('\n');

        // One line per poll-cycle request; flush so a crash loses nothing.
        let written = match file.write_all(line.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            error!("Failed to write recorded event: {}", e);
        }
    }
}
