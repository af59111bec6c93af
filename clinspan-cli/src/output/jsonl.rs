//! JSON Lines output formatter

use super::{DocumentRecord, OutputFormatter};
use anyhow::Result;
use std::io::Write;

/// JSONL formatter - one compact record per line, written as it arrives
pub struct JsonlFormatter<W: Write> {
    writer: W,
}

impl<W: Write> JsonlFormatter<W> {
    /// Create a new JSONL formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonlFormatter<W> {
    fn format_document(&mut self, record: &DocumentRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
