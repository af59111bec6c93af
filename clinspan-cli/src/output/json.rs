//! JSON output formatter

use super::{DocumentRecord, OutputFormatter};
use anyhow::Result;
use std::io::Write;

/// JSON formatter - outputs records as a pretty-printed JSON array
pub struct JsonFormatter<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn format_document(&mut self, record: &DocumentRecord) -> Result<()> {
        let separator = if self.written == 0 { "[\n" } else { ",\n" };
        self.writer.write_all(separator.as_bytes())?;
        serde_json::to_writer_pretty(&mut self.writer, record)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.written == 0 {
            self.writer.write_all(b"[")?;
        }
        writeln!(self.writer, "\n]")?;
        self.writer.flush()?;
        Ok(())
    }
}
