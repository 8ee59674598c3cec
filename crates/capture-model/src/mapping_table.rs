//! User-authored mapping tables.
//!
//! A mapping table is a CSV file with the header
//! `Type,Name,Target,Enabled,Multiplier,ValueShift,Smooth`. Each row binds
//! one capture signal (`Name`) to a target in the scene:
//!
//! - `BlendShape` rows name morph deformers (`|` separates several) or
//!   `item.channel` user channels.
//! - `Item` rows name an item whose last character is the rotation axis,
//!   e.g. `Head.Y` or `LeftEye_X`.
//!
//! This module only reads rows; turning them into bindings is the job of
//! the mapping resolver in the processing core.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use applicator_common::error::{ApplicatorError, ApplicatorResult};

use crate::take::{csv_format_error, csv_reader};

/// Row types understood by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowType {
    BlendShape,
    Item,
    /// Any other value in the `Type` column; ignored.
    Other,
}

/// One row of a mapping table, as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    /// One-based data row number (header excluded).
    #[serde(skip)]
    pub row: usize,

    #[serde(rename = "Type")]
    pub kind: String,

    /// Capture signal name.
    #[serde(rename = "Name")]
    pub name: String,

    /// Target specification; meaning depends on the row type.
    #[serde(rename = "Target", default)]
    pub target: String,

    /// `Y` enables the row.
    #[serde(rename = "Enabled", default)]
    pub enabled: String,

    /// Empty means 1.
    #[serde(rename = "Multiplier", default)]
    pub multiplier: Option<f64>,

    /// Empty means 0.
    #[serde(rename = "ValueShift", default)]
    pub value_shift: Option<f64>,

    /// `Y` enables the 7-frame moving average.
    #[serde(rename = "Smooth", default)]
    pub smooth: String,
}

impl MappingRecord {
    /// Classified row type.
    pub fn row_type(&self) -> RowType {
        match self.kind.as_str() {
            "BlendShape" => RowType::BlendShape,
            "Item" => RowType::Item,
            _ => RowType::Other,
        }
    }

    pub fn is_enabled(&self) -> bool {
        is_yes(&self.enabled)
    }

    pub fn is_smoothed(&self) -> bool {
        is_yes(&self.smooth)
    }

    /// Multiplier, defaulting to 1.
    pub fn multiplier(&self) -> f64 {
        self.multiplier.unwrap_or(1.0)
    }

    /// Value shift, defaulting to 0.
    pub fn value_shift(&self) -> f64 {
        self.value_shift.unwrap_or(0.0)
    }
}

fn is_yes(flag: &str) -> bool {
    flag.trim().eq_ignore_ascii_case("y")
}

/// A parsed mapping table.
#[derive(Debug, Clone)]
pub struct MappingTable {
    source: PathBuf,
    records: Vec<MappingRecord>,
}

impl MappingTable {
    /// Read a mapping table from a file.
    pub fn read(path: impl AsRef<Path>) -> ApplicatorResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ApplicatorError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ApplicatorError::Io(e),
        })?;
        Self::from_reader(path, file)
    }

    /// Parse a mapping table from in-memory text.
    pub fn parse(source: impl AsRef<Path>, content: &str) -> ApplicatorResult<Self> {
        Self::from_reader(source.as_ref(), content.as_bytes())
    }

    /// Build a table from records already in memory. Row numbers are assigned
    /// in order.
    pub fn from_records(records: Vec<MappingRecord>) -> Self {
        let records = records
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                record.row = index + 1;
                record
            })
            .collect();
        Self {
            source: PathBuf::from("<memory>"),
            records,
        }
    }

    fn from_reader<R: std::io::Read>(source: &Path, reader: R) -> ApplicatorResult<Self> {
        let mut csv_reader = csv_reader(reader);
        let mut records = Vec::new();
        for (index, record) in csv_reader.deserialize::<MappingRecord>().enumerate() {
            let mut record = record.map_err(|e| csv_format_error(source, e))?;
            record.row = index + 1;
            records.push(record);
        }
        tracing::debug!("Read {} mapping rows from {}", records.len(), source.display());
        Ok(Self {
            source: source.to_path_buf(),
            records,
        })
    }

    /// File the table was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Rows in file order.
    pub fn records(&self) -> &[MappingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
