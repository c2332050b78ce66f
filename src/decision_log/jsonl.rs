//! JSONL decision log.
//!
//! Writes one JSON object per line, appended as soon as the decision is
//! made, so a crash loses at most the record being written.

use async_trait::async_trait;
use log::{debug, info};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{DecisionSink, LogRecord};

/// Sink that appends records to a JSONL file.
pub struct JsonlDecisionLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl JsonlDecisionLog {
    /// The file (and its directory) are created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> std::io::Result<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir)?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?;
                info!("Decision log: appending to {}", self.path.display());
                BufWriter::new(file)
            }
        };
        Ok(self.writer.insert(writer))
    }
}

#[async_trait]
impl DecisionSink for JsonlDecisionLog {
    async fn append(
        &mut self,
        record: &LogRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let line = serde_json::to_string(record)?;
        let writer = self.writer()?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        self.written += 1;
        debug!("Logged decision #{} to {}", self.written, self.path.display());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Sink that fans out to multiple sinks.
pub struct MultiSink {
    sinks: Vec<Box<dyn DecisionSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn DecisionSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl DecisionSink for MultiSink {
    async fn append(
        &mut self,
        record: &LogRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for sink in &mut self.sinks {
            sink.append(record).await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for sink in &mut self.sinks {
            sink.flush().await?;
        }
        Ok(())
    }
}
