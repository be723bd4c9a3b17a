//! Run-over-run comparison against the previous snapshot.

use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::normalize::NormalizedSnapshot;
use crate::schema::Snapshot;

/// Before/after values of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Change {
    pub previous: f64,
    pub current: f64,
    pub delta: f64,
    pub percent: f64,
}

impl Change {
    fn between(test: &str, metric: &'static str, previous: f64, current: f64) -> Result<Self> {
        if previous == 0.0 {
            return Err(ReportError::DivisionByZeroBaseline {
                test: test.to_string(),
                metric,
            });
        }
        let delta = current - previous;
        Ok(Self {
            previous,
            current,
            delta,
            percent: delta / previous * 100.0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub name: String,
    pub energy: Change,
    pub time: Change,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub previous_file: String,
    /// Per-iteration total energy, current minus previous.
    pub overall_delta: f64,
    pub rows: Vec<ComparisonRow>,
}

/// The candidate run executed most recently before `current`.
///
/// Among candidates sharing that timestamp the first one wins.
pub fn select_previous<'a>(current: &Snapshot, candidates: &'a [Snapshot]) -> Result<&'a Snapshot> {
    let mut best: Option<&Snapshot> = None;
    for c in candidates {
        if c.execution_timestamp >= current.execution_timestamp {
            continue;
        }
        if best.map_or(true, |b| c.execution_timestamp > b.execution_timestamp) {
            best = Some(c);
        }
    }
    best.ok_or(ReportError::NoPriorSnapshot)
}

/// Per-test deltas of `current` against `previous`. Both sides must already
/// be per-iteration.
pub fn compare(current: &NormalizedSnapshot, previous: &NormalizedSnapshot) -> Result<Comparison> {
    let rows = current
        .tests
        .iter()
        .map(|test| {
            let before = previous
                .test(&test.name)
                .ok_or_else(|| ReportError::MissingBaseline {
                    test: test.name.clone(),
                })?;
            Ok(ComparisonRow {
                name: test.name.clone(),
                energy: Change::between(&test.name, "energy", before.energy_uj, test.energy_uj)?,
                time: Change::between(&test.name, "time", before.time_us, test.time_us)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Comparison {
        previous_file: previous.file_name.clone(),
        overall_delta: current.total_consumption - previous.total_consumption,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::normalize::tests::snapshot;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_sort_search_scenario() {
        let a = snapshot("a.json", 100, 2, &[("sort", 20.0, 10.0), ("search", 8.0, 4.0)]);
        let b = snapshot("b.json", 200, 1, &[("sort", 9.0, 5.0), ("search", 3.0, 2.0)]);

        let cmp = compare(&normalize(&b), &normalize(&a)).unwrap();
        assert_eq!(cmp.previous_file, "a.json");
        // 12 - 28 / 2
        assert!(close(cmp.overall_delta, -2.0));

        let sort = &cmp.rows[0];
        assert_eq!(sort.name, "sort");
        assert!(close(sort.energy.previous, 10.0));
        assert!(close(sort.energy.current, 9.0));
        assert!(close(sort.energy.delta, -1.0));
        assert!(close(sort.energy.percent, -10.0));
        assert!(close(sort.time.delta, 0.0));

        let search = &cmp.rows[1];
        assert!(close(search.energy.delta, -1.0));
        assert!(close(search.energy.percent, -25.0));
        assert!(close(search.time.percent, 0.0));
    }

    #[test]
    fn test_missing_baseline() {
        let prev = normalize(&snapshot("a.json", 1, 1, &[("sort", 1.0, 1.0)]));
        let cur = normalize(&snapshot("b.json", 2, 1, &[("sort", 1.0, 1.0), ("new", 1.0, 1.0)]));
        match compare(&cur, &prev) {
            Err(ReportError::MissingBaseline { test }) => assert_eq!(test, "new"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_tests_dropped_since_previous_are_ignored() {
        let prev = normalize(&snapshot("a.json", 1, 1, &[("sort", 1.0, 1.0), ("old", 1.0, 1.0)]));
        let cur = normalize(&snapshot("b.json", 2, 1, &[("sort", 2.0, 1.0)]));
        let cmp = compare(&cur, &prev).unwrap();
        assert_eq!(cmp.rows.len(), 1);
    }

    #[test]
    fn test_zero_baseline() {
        let prev = normalize(&snapshot("a.json", 1, 1, &[("sort", 0.0, 1.0)]));
        let cur = normalize(&snapshot("b.json", 2, 1, &[("sort", 3.0, 1.0)]));
        match compare(&cur, &prev) {
            Err(ReportError::DivisionByZeroBaseline { test, metric }) => {
                assert_eq!(test, "sort");
                assert_eq!(metric, "energy");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_select_previous() {
        let all = vec![
            snapshot("a.json", 100, 1, &[]),
            snapshot("b.json", 300, 1, &[]),
            snapshot("c.json", 200, 1, &[]),
            snapshot("d.json", 200, 1, &[]),
        ];
        assert_eq!(select_previous(&all[1], &all).unwrap().file_name, "c.json");
        assert_eq!(select_previous(&all[2], &all).unwrap().file_name, "a.json");
        assert!(matches!(
            select_previous(&all[0], &all),
            Err(ReportError::NoPriorSnapshot)
        ));
    }

    proptest! {
        #[test]
        fn prop_delta_arithmetic(
            pairs in prop::collection::vec(
                (1.0f64..1e6, 0.0f64..1e6, 1.0f64..1e6, 0.0f64..1e6),
                1..20,
            ),
            repeats in 1u64..10,
        ) {
            let names: Vec<String> = (0..pairs.len()).map(|i| format!("t{i}")).collect();
            let prev_rows: Vec<(&str, f64, f64)> =
                names.iter().zip(&pairs).map(|(n, p)| (n.as_str(), p.0, p.2)).collect();
            let cur_rows: Vec<(&str, f64, f64)> =
                names.iter().zip(&pairs).map(|(n, p)| (n.as_str(), p.1, p.3)).collect();
            let prev = normalize(&snapshot("a.json", 1, repeats, &prev_rows));
            let cur = normalize(&snapshot("b.json", 2, 1, &cur_rows));

            let cmp = compare(&cur, &prev).unwrap();
            for row in &cmp.rows {
                prop_assert_eq!(row.energy.current - row.energy.previous, row.energy.delta);
                prop_assert_eq!(row.energy.delta / row.energy.previous * 100.0, row.energy.percent);
                prop_assert_eq!(row.time.current - row.time.previous, row.time.delta);
            }
        }
    }
}
