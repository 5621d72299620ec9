//! Report output service

use crate::error::{BenchError, Result};
use crate::types::Report;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Service writing the final report document
pub struct ReportWriter;

impl ReportWriter {
    /// Serialize the report as JSON text
    pub fn to_json(report: &Report) -> Result<String> {
        Ok(serde_json::to_string(report)?)
    }

    /// Write the report to `path`, replacing any existing file
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Io` when the file cannot be created or written.
    pub fn write<P: AsRef<Path>>(report: &Report, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            BenchError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create report '{}': {}", path.display(), e),
            ))
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, report)?;
        writer.flush()?;
        Ok(())
    }
}
