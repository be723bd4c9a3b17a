//! Energy-over-time series across runs.
//!
//! Runs are placed on a sequential axis rather than a time axis: every
//! distinct ordering key gets the next integer position.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Serialize;

use crate::normalize::NormalizedSnapshot;

const REVISION_LABEL_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub position: usize,
    pub name: String,
    pub energy_uj: f64,
}

/// One x-axis tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tick {
    pub position: usize,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub points: Vec<SeriesPoint>,
    pub ticks: Vec<Tick>,
}

impl Series {
    /// Points grouped per test, each group in position order.
    pub fn lines(&self) -> BTreeMap<&str, Vec<(usize, f64)>> {
        let mut lines: BTreeMap<&str, Vec<(usize, f64)>> = BTreeMap::new();
        for p in &self.points {
            lines
                .entry(p.name.as_str())
                .or_default()
                .push((p.position, p.energy_uj));
        }
        lines
    }

    pub fn positions(&self) -> usize {
        self.ticks.len()
    }
}

/// Commit time when known, execution time otherwise; execution time breaks
/// ties between runs of the same commit.
fn ordering_key(s: &NormalizedSnapshot) -> (i64, i64) {
    (
        s.commit_timestamp.unwrap_or(s.execution_timestamp),
        s.execution_timestamp,
    )
}

pub fn tick_label(revision: Option<&str>, execution_timestamp: i64) -> String {
    let when = DateTime::from_timestamp(execution_timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| execution_timestamp.to_string());
    match revision {
        Some(rev) => {
            let short: String = rev.chars().take(REVISION_LABEL_LEN).collect();
            format!("{short} executed at {when}")
        }
        None => format!("executed at {when}"),
    }
}

/// Merges all snapshots into one positioned series.
///
/// Snapshots with an identical ordering key share a position; within it
/// their points follow file name order. The result does not depend on the
/// order of `snapshots`.
pub fn build_series(snapshots: &[NormalizedSnapshot]) -> Series {
    let mut ordered: Vec<&NormalizedSnapshot> = snapshots.iter().collect();
    ordered.sort_by(|a, b| {
        ordering_key(a)
            .cmp(&ordering_key(b))
            .then_with(|| a.file_name.cmp(&b.file_name))
    });

    let mut series = Series::default();
    let mut last_key = None;
    for s in ordered {
        let key = ordering_key(s);
        if last_key != Some(key) {
            last_key = Some(key);
            series.ticks.push(Tick {
                position: series.ticks.len(),
                label: tick_label(s.revision.as_deref(), s.execution_timestamp),
            });
        }
        let position = series.ticks.len() - 1;
        series.points.extend(s.tests.iter().map(|t| SeriesPoint {
            position,
            name: t.name.clone(),
            energy_uj: t.energy_uj,
        }));
    }
    series
}
