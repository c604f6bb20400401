//! Generation progress reporting

use std::path::PathBuf;

/// What the generator reports while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// An object's pipeline is starting
    ObjectStarted {
        name: String,
        position: usize,
        total: usize,
    },
    /// One coordinate of the current object has all its styles rendered
    CoordinateRendered {
        object: String,
        index: usize,
        total: usize,
    },
    /// An object finished and its CSV index is written
    ObjectCompleted(ObjectReport),
    /// An object failed and the run moved on
    ObjectSkipped { name: String, error: String },
}

/// Output of one fully generated object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectReport {
    pub name: String,
    /// Folder holding the object's renders and CSV
    pub object_dir: PathBuf,
    /// Rows in the CSV index, one per coordinate
    pub rows: usize,
    /// Images written
    pub images: usize,
}

/// An object left out of the dataset after a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedObject {
    pub name: String,
    pub error: String,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    pub objects: Vec<ObjectReport>,
    pub skipped: Vec<SkippedObject>,
}

impl GenerationReport {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            objects: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// CSV rows written across all objects.
    pub fn total_rows(&self) -> usize {
        self.objects.iter().map(|o| o.rows).sum()
    }

    pub fn total_images(&self) -> usize {
        self.objects.iter().map(|o| o.images).sum()
    }
}

/// Running tally built from progress events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationProgress {
    pub current_object: Option<String>,
    pub objects_done: usize,
    pub objects_total: usize,
    pub coordinates_done: usize,
    pub coordinates_total: usize,
}

impl GenerationProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the tally.
    pub fn apply(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::ObjectStarted { name, total, .. } => {
                self.current_object = Some(name.clone());
                self.objects_total = *total;
                self.coordinates_done = 0;
                self.coordinates_total = 0;
            }
            ProgressEvent::CoordinateRendered { index, total, .. } => {
                self.coordinates_done = index + 1;
                self.coordinates_total = *total;
            }
            ProgressEvent::ObjectCompleted(_) | ProgressEvent::ObjectSkipped { .. } => {
                self.objects_done += 1;
                self.current_object = None;
            }
        }
    }

    /// Estimated percentage complete (0.0 - 100.0).
    pub fn percent(&self) -> f64 {
        if self.objects_total == 0 {
            return 0.0;
        }
        let within = if self.coordinates_total > 0 && self.current_object.is_some() {
            self.coordinates_done as f64 / self.coordinates_total as f64
        } else {
            0.0
        };
        ((self.objects_done as f64 + within) / self.objects_total as f64 * 100.0).min(100.0)
    }

    /// Get a display string for the progress.
    pub fn display(&self) -> String {
        match &self.current_object {
            Some(name) => format!(
                "{:.1}% ({} {}/{})",
                self.percent(),
                name,
                self.coordinates_done,
                self.coordinates_total
            ),
            None => format!(
                "{:.1}% ({}/{} objects)",
                self.percent(),
                self.objects_done,
                self.objects_total
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tally() {
        let mut progress = GenerationProgress::new();
        progress.apply(&ProgressEvent::ObjectStarted {
            name: "a".to_string(),
            position: 0,
            total: 2,
        });
        progress.apply(&ProgressEvent::CoordinateRendered {
            object: "a".to_string(),
            index: 1,
            total: 4,
        });
        assert_eq!(progress.percent(), 25.0);
        assert_eq!(progress.display(), "25.0% (a 2/4)");

        progress.apply(&ProgressEvent::ObjectSkipped {
            name: "a".to_string(),
            error: "boom".to_string(),
        });
        assert_eq!(progress.percent(), 50.0);
        assert_eq!(progress.display(), "50.0% (1/2 objects)");
    }

    #[test]
    fn test_report_totals() {
        let mut report = GenerationReport::new(PathBuf::from("out"));
        for (name, rows) in [("a", 2), ("b", 3)] {
            report.objects.push(ObjectReport {
                name: name.to_string(),
                object_dir: PathBuf::from("out").join(name),
                rows,
                images: rows * 2,
            });
        }
        assert_eq!(report.total_rows(), 5);
        assert_eq!(report.total_images(), 10);
    }
}
