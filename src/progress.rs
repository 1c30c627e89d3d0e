//! Human-readable progress stream for a running batch.
//!
//! Lines look like `[INFO] message`. A stream is closed with
//! [`END_OF_LOG_MARKER`] so a consumer reading from a channel knows when to stop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

pub const END_OF_LOG_MARKER: &str = "---END_OF_LOG---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProgressLevel {
    Info,
    Debug,
    Success,
    Warning,
    Error,
}

impl ProgressLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressLevel::Info => "INFO",
            ProgressLevel::Debug => "DEBUG",
            ProgressLevel::Success => "SUCCESS",
            ProgressLevel::Warning => "WARNING",
            ProgressLevel::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub level: ProgressLevel,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(level: ProgressLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn line(&self) -> String {
        format!("[{}] {}", self.level.as_str(), self.message)
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("progress receiver dropped")]
    Closed,
    #[error("progress sink failed: {0}")]
    Other(String),
}

#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn notify(&self, event: &ProgressEvent) -> Result<(), SinkError>;

    /// Called once after the summary line.
    async fn finish(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl ProgressSink for NoopSink {
    async fn notify(&self, _event: &ProgressEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Prints lines to stdout as they arrive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    pub show_debug: bool,
}

#[async_trait]
impl ProgressSink for ConsoleSink {
    async fn notify(&self, event: &ProgressEvent) -> Result<(), SinkError> {
        if event.level != ProgressLevel::Debug || self.show_debug {
            println!("{}", event.line());
        }
        Ok(())
    }
}

/// Forwards formatted lines into an unbounded channel and terminates the
/// stream with the end marker.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ProgressSink for ChannelSink {
    async fn notify(&self, event: &ProgressEvent) -> Result<(), SinkError> {
        self.tx.send(event.line()).map_err(|_| SinkError::Closed)
    }

    async fn finish(&self) -> Result<(), SinkError> {
        self.tx
            .send(END_OF_LOG_MARKER.to_string())
            .map_err(|_| SinkError::Closed)
    }
}
