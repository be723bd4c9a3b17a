//! Per-iteration views of snapshots.
//!
//! Raw snapshots carry totals accumulated over `number_of_repeats`
//! iterations. [`normalize`] divides them once and returns a separate type,
//! so a value that is already per-iteration can never be divided again.

use serde::Serialize;
use std::num::NonZeroU64;

use crate::schema::{Snapshot, TestResult};

/// Per-iteration measurement of one test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTest {
    pub name: String,
    pub energy_uj: f64,
    pub time_us: f64,
}

/// A snapshot whose measurements have been divided by the repeat count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSnapshot {
    pub file_name: String,
    pub execution_timestamp: i64,
    pub commit_timestamp: Option<i64>,
    pub revision: Option<String>,
    /// Repeat count the raw values were divided by.
    pub number_of_repeats: NonZeroU64,
    pub total_consumption: f64,
    pub total_time: Option<f64>,
    pub overhead_energy: Option<f64>,
    pub overhead_time: Option<f64>,
    pub tests: Vec<NormalizedTest>,
}

fn per_iteration(value: f64, repeats: NonZeroU64) -> f64 {
    value / repeats.get() as f64
}

/// Total energy of one iteration of the whole suite.
pub fn normalized_total(snapshot: &Snapshot) -> f64 {
    per_iteration(snapshot.total_consumption, snapshot.number_of_repeats)
}

pub fn normalize(snapshot: &Snapshot) -> NormalizedSnapshot {
    let n = snapshot.number_of_repeats;
    NormalizedSnapshot {
        file_name: snapshot.file_name.clone(),
        execution_timestamp: snapshot.execution_timestamp,
        commit_timestamp: snapshot.commit_timestamp,
        revision: snapshot.revision.clone(),
        number_of_repeats: n,
        total_consumption: normalized_total(snapshot),
        total_time: snapshot.total_time.map(|v| per_iteration(v, n)),
        overhead_energy: snapshot.overhead_energy.map(|v| per_iteration(v, n)),
        overhead_time: snapshot.overhead_time.map(|v| per_iteration(v, n)),
        tests: snapshot
            .tests
            .iter()
            .map(|t| NormalizedTest {
                name: t.name.clone(),
                energy_uj: per_iteration(t.energy_uj, n),
                time_us: per_iteration(t.time_us, n),
            })
            .collect(),
    }
}

impl NormalizedSnapshot {
    pub fn test(&self, name: &str) -> Option<&NormalizedTest> {
        self.tests.iter().find(|t| t.name == name)
    }

    /// The per-iteration values as a raw snapshot of a single repeat.
    /// Normalizing the result reproduces `self` apart from the repeat count.
    pub fn to_per_iteration_snapshot(&self) -> Snapshot {
        Snapshot {
            file_name: self.file_name.clone(),
            execution_timestamp: self.execution_timestamp,
            commit_timestamp: self.commit_timestamp,
            revision: self.revision.clone(),
            number_of_repeats: NonZeroU64::MIN,
            total_consumption: self.total_consumption,
            total_time: self.total_time,
            overhead_energy: self.overhead_energy,
            overhead_time: self.overhead_time,
            tests: self
                .tests
                .iter()
                .map(|t| TestResult {
                    name: t.name.clone(),
                    energy_uj: t.energy_uj,
                    time_us: t.time_us,
                })
                .collect(),
        }
    }
}
