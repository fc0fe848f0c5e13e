//! Output handling for extracted records.
//!
//! Records are written as they arrive so a long extraction never holds the
//! whole record set in memory.

use crate::config::OutputFormat;
use crate::model::Record;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Target for output - either stdout or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => OutputTarget::File(p),
            None => OutputTarget::Stdout,
        }
    }
}

/// Streaming record writer for JSON Lines or a JSON array.
pub struct RecordSink {
    writer: BufWriter<Box<dyn Write>>,
    format: OutputFormat,
    written: usize,
}

impl RecordSink {
    /// Open a sink on stdout or a (truncated) file.
    pub fn open(target: &OutputTarget, format: OutputFormat) -> Result<Self> {
        let inner: Box<dyn Write> = match target {
            OutputTarget::Stdout => Box::new(std::io::stdout().lock()),
            OutputTarget::File(path) => Box::new(
                File::create(path)
                    .with_context(|| format!("Failed to create output file {}", path.display()))?,
            ),
        };
        Ok(Self::new(inner, format))
    }

    /// Wrap any writer.
    pub fn new(writer: Box<dyn Write>, format: OutputFormat) -> Self {
        Self {
            writer: BufWriter::new(writer),
            format,
            written: 0,
        }
    }

    pub fn write(&mut self, record: &Record) -> Result<()> {
        match self.format {
            OutputFormat::Jsonl => {
                serde_json::to_writer(&mut self.writer, record)?;
                self.writer.write_all(b"\n")?;
            }
            OutputFormat::Json => {
                let separator: &[u8] = if self.written == 0 { b"[\n" } else { b",\n" };
                self.writer.write_all(separator)?;
                serde_json::to_writer_pretty(&mut self.writer, record)?;
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Close the JSON array (if any) and flush. Returns the record count.
    pub fn finish(mut self) -> Result<usize> {
        if self.format == OutputFormat::Json {
            let closing: &[u8] = if self.written == 0 { b"[]\n" } else { b"\n]\n" };
            self.writer.write_all(closing)?;
        }
        self.writer.flush().context("Failed to flush output")?;
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attributes, NodeKind};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    /// Writer that keeps its bytes reachable after the sink is dropped.
    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn record(name: &str) -> Record {
        Record::new(NodeKind::Component, format!("Component_library_{name}"), Attributes::new())
    }

    #[test]
    fn test_output_target_from_option() {
        assert_eq!(OutputTarget::from_option(None), OutputTarget::Stdout);
        let path = PathBuf::from("/tmp/records.jsonl");
        assert_eq!(
            OutputTarget::from_option(Some(path.clone())),
            OutputTarget::File(path)
        );
    }

    #[test]
    fn test_jsonl_output() {
        let buffer = Shared::default();
        let mut sink = RecordSink::new(Box::new(buffer.clone()), OutputFormat::Jsonl);
        sink.write(&record("a")).unwrap();
        sink.write(&record("b")).unwrap();
        assert_eq!(sink.finish().unwrap(), 2);

        let text = buffer.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["identity"], "Component_library_a");
    }

    #[test]
    fn test_json_array_output() {
        let buffer = Shared::default();
        let mut sink = RecordSink::new(Box::new(buffer.clone()), OutputFormat::Json);
        sink.write(&record("a")).unwrap();
        sink.write(&record("b")).unwrap();
        sink.finish().unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&buffer.text()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1]["identity"], "Component_library_b");
    }

    #[test]
    fn test_empty_json_array() {
        let buffer = Shared::default();
        let sink = RecordSink::new(Box::new(buffer.clone()), OutputFormat::Json);
        assert_eq!(sink.finish().unwrap(), 0);
        assert_eq!(buffer.text(), "[]\n");
    }
}
