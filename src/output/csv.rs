//! Per-object CSV index of rendered coordinates

use std::io::{self, Write};
use std::path::Path;

use glam::DVec3;

use crate::config::Texture;

/// Column names of the index file.
pub const CSV_HEADER: [&str; 5] = ["index", "view-x", "view-y", "view-z", "texture"];

/// One rendered coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsvRow {
    pub index: usize,
    pub view: DVec3,
    pub texture: Texture,
}

impl CsvRow {
    fn record(&self) -> [String; 5] {
        [
            self.index.to_string(),
            self.view.x.to_string(),
            self.view.y.to_string(),
            self.view.z.to_string(),
            self.texture.to_string(),
        ]
    }
}

/// Rows collected while an object renders, written once at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvIndex {
    rows: Vec<CsvRow>,
}

impl CsvIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, index: usize, view: DVec3, texture: Texture) {
        self.rows.push(CsvRow { index, view, texture });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write header and rows, one record per line.
    pub fn write_to<W: Write>(&self, writer: W) -> io::Result<()> {
        self.write_records(csv::Writer::from_writer(writer))
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        self.write_records(csv::Writer::from_path(path)?)
    }

    fn write_records<W: Write>(&self, mut writer: csv::Writer<W>) -> io::Result<()> {
        writer.write_record(CSV_HEADER)?;
        for row in &self.rows {
            writer.write_record(row.record())?;
        }
        writer.flush()
    }
}
