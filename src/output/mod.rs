//! Dataset output layout
//!
//! ```text
//! <output_dir>/<object>/<object>.csv
//! <output_dir>/<object>/<object>_normalized.obj
//! <output_dir>/<object>/<index>/<style>.png
//! ```

mod csv;

pub use csv::{CsvIndex, CsvRow, CSV_HEADER};

use std::io;
use std::path::{Path, PathBuf};

use crate::config::RenderStyle;

/// File placement for one object's renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    object_name: String,
    object_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(output_dir: &Path, object_name: &str) -> Self {
        Self {
            object_name: object_name.to_string(),
            object_dir: output_dir.join(object_name),
        }
    }

    /// Folder receiving everything produced for the object.
    pub fn object_dir(&self) -> &Path {
        &self.object_dir
    }

    /// Create the object folder and any missing parents.
    ///
    /// Fails with `AlreadyExists` if the object folder is already there, so a
    /// previous dataset is never mixed with a new one.
    pub fn create_object_dir(&self) -> io::Result<()> {
        if let Some(parent) = self.object_dir.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir(&self.object_dir)
    }

    pub fn index_dir(&self, index: usize) -> PathBuf {
        self.object_dir.join(index.to_string())
    }

    /// Create the folder for one coordinate's renders.
    pub fn create_index_dir(&self, index: usize) -> io::Result<PathBuf> {
        let dir = self.index_dir(index);
        std::fs::create_dir(&dir)?;
        Ok(dir)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.object_dir.join(format!("{}.csv", self.object_name))
    }

    pub fn normalized_model_path(&self) -> PathBuf {
        self.object_dir.join(format!("{}_normalized.obj", self.object_name))
    }
}

/// Image written for `style` inside a coordinate folder.
pub fn image_path(index_dir: &Path, style: RenderStyle) -> PathBuf {
    index_dir.join(format!("{}.png", style.as_str()))
}
