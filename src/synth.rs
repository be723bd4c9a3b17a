//! Deterministic synthetic snapshot histories.
//!
//! Used by the `generate` subcommand, the benches and the end-to-end tests to
//! produce a results directory that looks like a series of real runner
//! outputs: stable per-test baselines with a small drift from run to run.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::fs;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};
use crate::schema::{Snapshot, TestResult};

/// Configuration for history generation.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Number of runs (snapshot files).
    pub runs: usize,
    /// Number of tests per run.
    pub tests: usize,
    pub repeats: NonZeroU64,
    pub seed: u64,
    /// Execution timestamp of the first run.
    pub start_timestamp: i64,
    /// Seconds between consecutive runs.
    pub interval_secs: i64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            runs: 5,
            tests: 12,
            repeats: NonZeroU64::new(10).unwrap_or(NonZeroU64::MIN),
            seed: 42,
            start_timestamp: 1_700_000_000,
            interval_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    energy_uj: f64,
    time_us: f64,
}

fn per_run_seed(master_seed: u64, index: usize) -> u64 {
    master_seed
        .wrapping_add(index as u64)
        .wrapping_mul(0x517cc1b727220a95)
}

fn baselines(config: &GenerateConfig) -> Vec<Baseline> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    (0..config.tests)
        .map(|_| Baseline {
            energy_uj: rng.gen_range(100.0..100_000.0),
            time_us: rng.gen_range(10.0..50_000.0),
        })
        .collect()
}

pub fn test_name(index: usize) -> String {
    format!("tests::case_{index:03}")
}

pub fn file_name(marker: &str, execution_timestamp: i64) -> String {
    format!("{marker}-{execution_timestamp}.json")
}

fn generate_run(
    config: &GenerateConfig,
    marker: &str,
    baselines: &[Baseline],
    index: usize,
) -> Snapshot {
    let mut rng = ChaCha8Rng::seed_from_u64(per_run_seed(config.seed, index));
    let repeats = config.repeats.get() as f64;
    let execution_timestamp = config.start_timestamp + index as i64 * config.interval_secs;

    let tests: Vec<TestResult> = baselines
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let drift: f64 = rng.gen_range(0.9..1.1);
            TestResult {
                name: test_name(i),
                energy_uj: (b.energy_uj * drift * repeats).round(),
                time_us: (b.time_us * drift * repeats).round(),
            }
        })
        .collect();

    let test_energy: f64 = tests.iter().map(|t| t.energy_uj).sum();
    let test_time: f64 = tests.iter().map(|t| t.time_us).sum();
    let overhead_energy = (test_energy * rng.gen_range(0.01..0.05)).round();
    let overhead_time = (test_time * rng.gen_range(0.01..0.05)).round();
    let head: [u8; 20] = rng.gen();

    Snapshot {
        file_name: file_name(marker, execution_timestamp),
        execution_timestamp,
        commit_timestamp: Some(execution_timestamp - rng.gen_range(60..3_600)),
        revision: Some(hex::encode(head)),
        number_of_repeats: config.repeats,
        total_consumption: test_energy + overhead_energy,
        total_time: Some(test_time + overhead_time),
        overhead_energy: Some(overhead_energy),
        overhead_time: Some(overhead_time),
        tests,
    }
}

/// Generate `config.runs` snapshots in execution order.
pub fn generate_history(config: &GenerateConfig, marker: &str) -> Vec<Snapshot> {
    let baselines = baselines(config);
    (0..config.runs)
        .into_par_iter()
        .map(|i| generate_run(config, marker, &baselines, i))
        .collect()
}

/// Write a generated history as runner-format JSON files into `dir`.
pub fn write_history(dir: &Path, config: &GenerateConfig, marker: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;

    let mut written = Vec::with_capacity(config.runs);
    for snapshot in generate_history(config, marker) {
        let path = dir.join(&snapshot.file_name);
        let json = serde_json::to_vec_pretty(&snapshot.to_raw())?;
        fs::write(&path, json).map_err(|e| ReportError::io(&path, e))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader;
    use tempfile::tempdir;

    #[test]
    fn test_generate_deterministic() {
        let config = GenerateConfig::default();
        let a = generate_history(&config, "coppers_results");
        let b = generate_history(&config, "coppers_results");
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_history() {
        let a = generate_history(&GenerateConfig::default(), "m");
        let b = generate_history(
            &GenerateConfig {
                seed: 7,
                ..Default::default()
            },
            "m",
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_shape() {
        let config = GenerateConfig {
            runs: 3,
            tests: 4,
            ..Default::default()
        };
        let history = generate_history(&config, "coppers_results");
        assert_eq!(history.len(), 3);
        for (i, s) in history.iter().enumerate() {
            assert_eq!(s.tests.len(), 4);
            assert_eq!(
                s.execution_timestamp,
                config.start_timestamp + i as i64 * config.interval_secs
            );
            assert!(s.commit_timestamp.unwrap() < s.execution_timestamp);
            assert_eq!(s.revision.as_ref().unwrap().len(), 40);
            assert!(s.total_consumption > s.tests.iter().map(|t| t.energy_uj).sum::<f64>());
        }
    }

    #[test]
    fn test_write_and_load() {
        let dir = tempdir().unwrap();
        let config = GenerateConfig {
            runs: 2,
            ..Default::default()
        };
        let paths = write_history(dir.path(), &config, "coppers_results").unwrap();
        let expected = generate_history(&config, "coppers_results");

        assert_eq!(paths.len(), 2);
        for (path, snapshot) in paths.iter().zip(&expected) {
            assert_eq!(&loader::load(path).unwrap(), snapshot);
        }
    }
}
