//! Discovery of snapshot files inside the results directory.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::loader;
use crate::schema::Snapshot;

pub fn is_snapshot_file(file_name: &str, marker: &str) -> bool {
    file_name.contains(marker) && file_name.ends_with(".json")
}

/// The part of the stem after the marker and its separator, e.g. `1700000000`
/// in `coppers_results-1700000000.json`.
pub fn run_id<'a>(file_name: &'a str, marker: &str) -> Option<&'a str> {
    let stem = file_name.strip_suffix(".json")?;
    let at = stem.rfind(marker)?;
    Some(stem[at + marker.len()..].trim_start_matches(['-', '_', '.']))
}

/// The snapshot with the greatest execution timestamp; the first one wins a
/// tie, so callers pass snapshots in file name order.
pub fn latest_of(snapshots: &[Snapshot]) -> Option<&Snapshot> {
    let mut latest: Option<&Snapshot> = None;
    for s in snapshots {
        if latest.map_or(true, |l| s.execution_timestamp > l.execution_timestamp) {
            latest = Some(s);
        }
    }
    latest
}

/// View of one results directory. Holds no state beyond the directory and
/// marker; every call re-reads the filesystem.
#[derive(Clone, Debug)]
pub struct SnapshotRepository {
    dir: PathBuf,
    marker: String,
}

impl SnapshotRepository {
    pub fn new(dir: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            marker: marker.into(),
        }
    }

    pub fn from_config(cfg: &ReportConfig) -> Self {
        Self::new(cfg.results_dir.clone(), cfg.marker.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Qualifying file names, sorted lexicographically.
    pub fn list_snapshot_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        // Followed links report their target's file type.
        let walker = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.dir).to_path_buf();
                ReportError::io(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if is_snapshot_file(&name, &self.marker) {
                names.push(name.into_owned());
            }
        }
        names.sort();
        debug!(dir = %self.dir.display(), count = names.len(), "scanned results directory");
        Ok(names)
    }

    fn non_empty_listing(&self) -> Result<Vec<String>> {
        let names = self.list_snapshot_files()?;
        if names.is_empty() {
            return Err(ReportError::NoSnapshotsFound {
                dir: self.dir.clone(),
            });
        }
        Ok(names)
    }

    /// File name of the run with the greatest execution timestamp.
    ///
    /// Ties go to the lexicographically first file name.
    pub fn find_latest(&self) -> Result<String> {
        let all = self.load_all()?;
        latest_of(&all)
            .map(|s| s.file_name.clone())
            .ok_or_else(|| ReportError::NoSnapshotsFound {
                dir: self.dir.clone(),
            })
    }

    /// File whose [`run_id`] is exactly `id`. Failing that, the single file
    /// whose stem ends with `id`; several such files are ambiguous.
    pub fn find_by_id(&self, id: &str) -> Result<String> {
        let names = self.non_empty_listing()?;
        if let Some(name) = names
            .iter()
            .find(|name| run_id(name, &self.marker) == Some(id))
        {
            return Ok(name.clone());
        }

        let mut suffixed: Vec<String> = names
            .into_iter()
            .filter(|name| {
                !id.is_empty()
                    && name
                        .strip_suffix(".json")
                        .is_some_and(|stem| stem.ends_with(id))
            })
            .collect();
        match suffixed.len() {
            0 => Err(ReportError::SnapshotNotFound { id: id.to_string() }),
            1 => Ok(suffixed.remove(0)),
            _ => Err(ReportError::AmbiguousSnapshotId {
                id: id.to_string(),
                candidates: suffixed,
            }),
        }
    }

    pub fn load(&self, file_name: &str) -> Result<Snapshot> {
        loader::load(&self.path_of(file_name))
    }

    /// Loads every qualifying snapshot in parallel; the result is in file
    /// name order and only assembled once every load has finished.
    pub fn load_all(&self) -> Result<Vec<Snapshot>> {
        let names = self.non_empty_listing()?;
        names
            .par_iter()
            .map(|name| loader::load(&self.path_of(name)))
            .collect()
    }
}
