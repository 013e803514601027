//! File-backed diagnostic record sink.
//!
//! Appends text to a single file (SPIFFS on target, any path on host).
//! The file is opened per append so a half-initialised filesystem at
//! boot does not poison later writes.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::app::ports::{RecordError, RecordSink};

pub struct FileRecordSink {
    path: PathBuf,
}

impl FileRecordSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl RecordSink for FileRecordSink {
    fn append(&mut self, text: &str) -> Result<(), RecordError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|_| RecordError)?;
        file.write_all(text.as_bytes()).map_err(|_| RecordError)?;
        file.flush().map_err(|_| RecordError)
    }
}
