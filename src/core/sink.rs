use crate::core::SequenceSink;
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};

/// Rendering of one digit in an output line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Decimal,
    Hex,
}

impl OutputFormat {
    /// Writes one line: every digit followed by a single space, then `\n`.
    pub fn write_line<W: Write>(self, out: &mut W, digits: &[u8]) -> std::io::Result<()> {
        for digit in digits {
            match self {
                OutputFormat::Decimal => write!(out, "{} ", digit)?,
                OutputFormat::Hex => write!(out, "{:02x} ", digit)?,
            }
        }
        out.write_all(b"\n")
    }
}

/// Line-oriented sink over any writer, buffered between flushes.
pub struct WriterSink<W: Write> {
    out: BufWriter<W>,
    format: OutputFormat,
    flush_every: u64,
    pending: u64,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W, format: OutputFormat, flush_every: u64) -> Self {
        Self {
            out: BufWriter::new(out),
            format,
            flush_every: flush_every.max(1),
            pending: 0,
        }
    }

    pub fn into_inner(self) -> std::io::Result<W> {
        self.out.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> SequenceSink for WriterSink<W> {
    fn emit(&mut self, digits: &[u8]) -> std::io::Result<()> {
        self.format.write_line(&mut self.out, digits)?;

        self.pending += 1;
        if self.pending >= self.flush_every {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.pending = 0;
        self.out.flush()
    }
}

/// Keeps every emitted sequence; used to inspect a run.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub lines: Vec<Vec<u8>>,
}

impl SequenceSink for MemorySink {
    fn emit(&mut self, digits: &[u8]) -> std::io::Result<()> {
        self.lines.push(digits.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
