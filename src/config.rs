use std::path::{Path, PathBuf};

use crate::OutputFormat;

pub const DEFAULT_RESULTS_DIR: &str = "target/coppers_results";
pub const DEFAULT_OUTPUT_DIR: &str = "target/coppers_report";
pub const DEFAULT_MARKER: &str = "coppers_results";
pub const DEFAULT_TOP_N: usize = 3;

/// Everything a report run needs to know about where snapshots live and
/// what to produce. Passed explicitly to the scanner and the pipeline.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    pub results_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Substring a file name must contain to count as a snapshot.
    pub marker: String,
    pub top_n: usize,
    /// Identifier embedded in the file name of the snapshot to report on.
    /// `None` selects the latest run.
    pub target: Option<String>,
    pub format: OutputFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            marker: DEFAULT_MARKER.to_string(),
            top_n: DEFAULT_TOP_N,
            target: None,
            format: OutputFormat::Html,
        }
    }
}

impl ReportConfig {
    pub fn for_results_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: dir.into(),
            ..Default::default()
        }
    }

    pub fn snapshot_path(&self, file_name: &str) -> PathBuf {
        self.results_dir.join(file_name)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.format.file_name())
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }
}
