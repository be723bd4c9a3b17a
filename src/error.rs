use std::io;
use std::path::PathBuf;

/// Errors produced while scanning, loading and deriving report facts.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("no snapshot files found in {}", .dir.display())]
    NoSnapshotsFound { dir: PathBuf },

    #[error("no snapshot file matches identifier {id:?}")]
    SnapshotNotFound { id: String },

    #[error("identifier {id:?} matches several snapshot files: {candidates:?}")]
    AmbiguousSnapshotId { id: String, candidates: Vec<String> },

    #[error("malformed snapshot {}: {reason}", .path.display())]
    MalformedSnapshot { path: PathBuf, reason: String },

    #[error("requested top {requested} tests but the snapshot only has {available}")]
    InsufficientTests { requested: usize, available: usize },

    #[error("test {test:?} has no baseline in the previous snapshot")]
    MissingBaseline { test: String },

    #[error("baseline {metric} of test {test:?} is zero, percentage change is undefined")]
    DivisionByZeroBaseline { test: String, metric: &'static str },

    #[error("no snapshot precedes the current one")]
    NoPriorSnapshot,

    #[error("unknown report template {0:?}")]
    UnknownTemplate(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedSnapshot {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors that only invalidate one report section.
    ///
    /// Everything else aborts report generation.
    pub fn is_section_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientTests { .. }
                | Self::MissingBaseline { .. }
                | Self::DivisionByZeroBaseline { .. }
                | Self::NoPriorSnapshot
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
