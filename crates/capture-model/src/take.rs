//! Capture takes read from delimited text files.
//!
//! A take is the ordered sequence of frames recorded by a capture app.
//! The first row names the signals; every following row is one captured
//! instant holding the raw decimal strings exactly as written. Values are
//! kept as text because downstream parsing deliberately truncates them.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use applicator_common::error::{ApplicatorError, ApplicatorResult};

/// One captured instant: the raw field strings in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFrame {
    fields: Vec<String>,
}

impl CaptureFrame {
    /// Raw field at a column index.
    pub fn field(&self, column: usize) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// All raw fields in header order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// An ordered, indexable sequence of capture frames sharing one header.
#[derive(Debug, Clone)]
pub struct Take {
    source: PathBuf,
    signals: Vec<String>,
    columns: HashMap<String, usize>,
    frames: Vec<CaptureFrame>,
}

impl Take {
    /// Read a take from a file.
    pub fn read(path: impl AsRef<Path>) -> ApplicatorResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ApplicatorError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ApplicatorError::Io(e),
        })?;
        let take = Self::from_reader(path, file)?;
        tracing::debug!(
            "Read {} frames x {} signals from {}",
            take.len(),
            take.signals.len(),
            path.display()
        );
        Ok(take)
    }

    /// Parse a take from in-memory text. `source` is only used in errors.
    pub fn parse(source: impl AsRef<Path>, content: &str) -> ApplicatorResult<Self> {
        Self::from_reader(source.as_ref(), content.as_bytes())
    }

    fn from_reader<R: Read>(source: &Path, reader: R) -> ApplicatorResult<Self> {
        let mut csv_reader = csv_reader(reader);

        let header = csv_reader
            .headers()
            .map_err(|e| csv_format_error(source, e))?
            .clone();
        if header.iter().all(str::is_empty) {
            return Err(ApplicatorError::file_format(source, "missing header row"));
        }

        let signals: Vec<String> = header.iter().map(str::to_string).collect();
        let mut columns = HashMap::with_capacity(signals.len());
        for (index, name) in signals.iter().enumerate() {
            columns.entry(name.clone()).or_insert(index);
        }

        let mut frames = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| csv_format_error(source, e))?;
            frames.push(CaptureFrame {
                fields: record.iter().map(str::to_string).collect(),
            });
        }

        Ok(Self {
            source: source.to_path_buf(),
            signals,
            columns,
            frames,
        })
    }

    /// File the take was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Signal names in column order.
    pub fn signals(&self) -> &[String] {
        &self.signals
    }

    /// Column index of a signal (first occurrence for duplicated headers).
    pub fn column(&self, signal: &str) -> Option<usize> {
        self.columns.get(signal).copied()
    }

    /// Whether the take records `signal`.
    pub fn has_signal(&self, signal: &str) -> bool {
        self.columns.contains_key(signal)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All frames in capture order.
    pub fn frames(&self) -> &[CaptureFrame] {
        &self.frames
    }

    /// Frame at an index.
    pub fn frame(&self, index: usize) -> Option<&CaptureFrame> {
        self.frames.get(index)
    }

    /// Raw value of `signal` at frame `index`.
    pub fn value(&self, index: usize, signal: &str) -> Option<&str> {
        let column = self.column(signal)?;
        self.frames.get(index)?.field(column)
    }

    /// Column view of one signal, or a format error naming the missing column.
    pub fn track(&self, signal: &str) -> ApplicatorResult<SignalTrack<'_>> {
        let column = self.column(signal).ok_or_else(|| {
            ApplicatorError::file_format(&self.source, format!("no column named '{signal}'"))
        })?;
        Ok(SignalTrack {
            take: self,
            column,
            signal: signal.to_string(),
        })
    }
}

/// Read-only view of a single signal column across a take.
#[derive(Debug, Clone)]
pub struct SignalTrack<'a> {
    take: &'a Take,
    column: usize,
    signal: String,
}

impl<'a> SignalTrack<'a> {
    /// Signal name.
    pub fn signal(&self) -> &str {
        &self.signal
    }

    /// Number of samples (frames in the take).
    pub fn len(&self) -> usize {
        self.take.len()
    }

    pub fn is_empty(&self) -> bool {
        self.take.is_empty()
    }

    /// Raw sample at a frame index.
    pub fn raw(&self, index: usize) -> Option<&'a str> {
        self.take.frames.get(index)?.field(self.column)
    }

    /// File the samples came from.
    pub fn source(&self) -> &'a Path {
        &self.take.source
    }
}

/// CSV reader configured for capture and mapping files.
pub(crate) fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Convert a CSV error into a file format error for `source`.
pub(crate) fn csv_format_error(source: &Path, err: csv::Error) -> ApplicatorError {
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => {
            let line = pos
                .as_ref()
                .map(|p| p.line().to_string())
                .unwrap_or_else(|| "?".to_string());
            format!("line {line} has {len} fields, header has {expected_len}")
        }
        _ => err.to_string(),
    };
    ApplicatorError::file_format(source, message)
}
