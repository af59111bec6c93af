//! Plain text output formatter

use super::{DocumentRecord, OutputFormatter};
use anyhow::Result;
use clinspan_engine::Summary;
use std::io::{self, Write};

/// Plain text formatter - a readable listing per file
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl TextFormatter<io::Stdout> {
    /// Create a formatter that writes to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextFormatter<W> {
    fn write_summary(&mut self, heading: &str, summary: &Summary) -> Result<()> {
        for category in summary.categories() {
            let Some(labels) = summary.category(category) else {
                continue;
            };
            for (label, concept) in labels {
                let mentions: usize = concept.sentences.iter().map(|s| s.tokens.len()).sum();
                writeln!(
                    self.writer,
                    "  {heading} {category}: {label} ({}) x{mentions}",
                    concept.concept_id
                )?;
            }
        }
        Ok(())
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn format_document(&mut self, record: &DocumentRecord) -> Result<()> {
        let annotation = &record.annotation;
        writeln!(self.writer, "== {} ==", record.file)?;

        for sentence in &annotation.conditions {
            for code in &sentence.codes {
                writeln!(
                    self.writer,
                    "  [{}..{}] {} ({}): {}",
                    code.start, code.end, code.tag, code.concept_id, code.triggers
                )?;
            }
        }
        self.write_summary("demographic", &annotation.demographic_summary)?;
        if let Some(vitals) = &annotation.vitals {
            for sign in &vitals.signs {
                writeln!(
                    self.writer,
                    "  [{}..{}] {} {}",
                    sign.span.start,
                    sign.span.end,
                    sign.kind.category(),
                    sign.value
                )?;
            }
        }
        for negated in &annotation.negated {
            writeln!(
                self.writer,
                "  negated [{}..{}] {}",
                negated.entity.span.start, negated.entity.span.end, negated.entity.tag
            )?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
