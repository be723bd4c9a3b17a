//! Snapshot loading: JSON file -> validated [`Snapshot`].

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ReportError, Result};
use crate::schema::{RawSnapshot, Snapshot};

/// Reads and validates one snapshot file.
///
/// Shape errors (missing `tests`, non-numeric measurements, zero repeats,
/// duplicate names) become [`ReportError::MalformedSnapshot`] carrying `path`.
pub fn load(path: &Path) -> Result<Snapshot> {
    let bytes = fs::read(path).map_err(|e| ReportError::io(path, e))?;
    let snapshot = parse(path, &bytes)?;
    debug!(
        file = %snapshot.file_name,
        tests = snapshot.tests.len(),
        repeats = snapshot.number_of_repeats.get(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

pub fn parse(path: &Path, bytes: &[u8]) -> Result<Snapshot> {
    let raw: RawSnapshot =
        serde_json::from_slice(bytes).map_err(|e| ReportError::malformed(path, e))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Snapshot::from_raw(file_name, raw).map_err(|reason| ReportError::malformed(path, reason))
}
