//! JSONL action writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use gesturemouse_common::clock::TimestampNs;
use gesturemouse_common::error::{GestureError, GestureResult};
use gesturemouse_hand_model::action::{ActionStreamHeader, OutputAction, TimedAction};

use crate::InputSink;

/// Writes timed actions as JSONL, one action per line after a `#` header.
pub struct ActionWriter {
    writer: BufWriter<Box<dyn Write + Send>>,
    path: Option<PathBuf>,
    actions_written: u64,
}

impl ActionWriter {
    /// Create (or truncate) a file, writing the header as the first line.
    pub fn create(path: impl AsRef<Path>, header: &ActionStreamHeader) -> GestureResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file: File = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        Self::with_writer(Box::new(file), Some(path), header)
    }

    /// Write to standard output.
    pub fn stdout(header: &ActionStreamHeader) -> GestureResult<Self> {
        Self::with_writer(Box::new(std::io::stdout()), None, header)
    }

    fn with_writer(
        inner: Box<dyn Write + Send>,
        path: Option<PathBuf>,
        header: &ActionStreamHeader,
    ) -> GestureResult<Self> {
        let mut writer = BufWriter::new(inner);

        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| GestureError::sink(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path,
            actions_written: 0,
        })
    }

    /// Write a single action as a JSONL line.
    pub fn write_action(&mut self, action: &TimedAction) -> GestureResult<()> {
        let json = serde_json::to_string(action)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| GestureError::sink(format!("Failed to write action: {e}")))?;
        self.actions_written += 1;

        if self.actions_written % 1000 == 0 {
            self.flush_writer()?;
        }

        Ok(())
    }

    fn flush_writer(&mut self) -> GestureResult<()> {
        self.writer
            .flush()
            .map_err(|e| GestureError::sink(format!("Failed to flush actions: {e}")))
    }

    pub fn actions_written(&self) -> u64 {
        self.actions_written
    }

    /// Output file, or `None` for stdout.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl InputSink for ActionWriter {
    fn apply(&mut self, timestamp_ns: TimestampNs, action: &OutputAction) -> GestureResult<()> {
        self.write_action(&TimedAction::new(timestamp_ns, *action))
    }

    fn name(&self) -> &str {
        if self.path.is_some() {
            "jsonl-file"
        } else {
            "jsonl-stdout"
        }
    }

    fn flush(&mut self) -> GestureResult<()> {
        self.flush_writer()
    }
}

impl Drop for ActionWriter {
    fn drop(&mut self) {
        let _ = self.flush_writer();
    }
}
