use coppers_report::config::ReportConfig;
use coppers_report::report::{self, HtmlRenderer, Section};
use coppers_report::scanner::SnapshotRepository;
use coppers_report::synth::{self, GenerateConfig};
use coppers_report::{OutputFormat, ReportError};
use std::fs;
use tempfile::tempdir;

const MARKER: &str = "coppers_results";

#[test]
fn test_synthetic_history_end_to_end() {
    let dir = tempdir().unwrap();
    let results = dir.path().join("results");
    let gen_config = GenerateConfig {
        runs: 4,
        tests: 6,
        ..Default::default()
    };
    synth::write_history(&results, &gen_config, MARKER).unwrap();

    let cfg = ReportConfig {
        output_dir: dir.path().join("report"),
        ..ReportConfig::for_results_dir(&results)
    };
    let facts = report::build_facts(&cfg).unwrap();

    let latest = SnapshotRepository::from_config(&cfg).find_latest().unwrap();
    assert_eq!(facts.snapshot_file, latest);
    assert_eq!(facts.snapshots_found, 4);
    assert!(facts.omitted.is_empty(), "{:?}", facts.omitted);

    let series = facts.series.as_ref().unwrap();
    assert_eq!(series.positions(), 4);
    assert_eq!(series.points.len(), 4 * 6);

    let cmp = facts.comparison.as_ref().unwrap();
    assert_eq!(cmp.rows.len(), 6);
    for row in &cmp.rows {
        assert_eq!(row.energy.current - row.energy.previous, row.energy.delta);
    }

    let html = report::render(&cfg, &facts, &HtmlRenderer).unwrap();
    assert!(html.contains("<h2>3 most energy consuming tests</h2>"));
    assert!(html.contains("<h2>3 least energy consuming tests</h2>"));
    assert!(html.contains("<tr><td>Tests</td><td>6</td></tr>"));
    assert!(html.contains("Energy consumption over time"));
    assert!(html.contains("Comparison with previous run"));
    assert!(html.contains("<table class=\"comparison\">"));

    let path = report::write_report(&cfg, &html).unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), html);
}

#[test]
fn test_two_runs_scenario() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("coppers_results-100.json"),
        r#"{"execution_timestamp": 100, "number_of_repeats": 2, "total_uj": 28,
            "tests": [{"name": "sort", "uj": 20, "us": 10}, {"name": "search", "uj": 8, "us": 4}]}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("coppers_results-200.json"),
        r#"{"execution_timestamp": 200, "number_of_repeats": 1, "total_uj": 12,
            "tests": [{"name": "sort", "uj": 9, "us": 5}, {"name": "search", "uj": 3, "us": 2}]}"#,
    )
    .unwrap();

    let cfg = ReportConfig {
        top_n: 2,
        format: OutputFormat::Json,
        ..ReportConfig::for_results_dir(dir.path())
    };
    let facts = report::build_facts(&cfg).unwrap();
    assert_eq!(facts.snapshot_file, "coppers_results-200.json");
    // Two runs: no series, but a comparison.
    assert!(facts.series.is_none());
    assert_eq!(facts.omitted[0].section, Section::OverTime);

    let cmp = facts.comparison.as_ref().unwrap();
    assert_eq!(cmp.overall_delta, -2.0);
    assert_eq!(cmp.rows[0].name, "sort");
    assert_eq!(cmp.rows[0].energy.delta, -1.0);
    assert!((cmp.rows[0].energy.percent + 10.0).abs() < 1e-9);
    assert_eq!(cmp.rows[1].name, "search");
    assert_eq!(cmp.rows[1].energy.delta, -1.0);
    assert!((cmp.rows[1].energy.percent + 25.0).abs() < 1e-9);

    let json = report::render(&cfg, &facts, &HtmlRenderer).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["comparison"]["previous_file"], "coppers_results-100.json");
    assert_eq!(value["ranking"]["top"][0]["name"], "sort");
}

#[test]
fn test_empty_results_dir() {
    let dir = tempdir().unwrap();
    let cfg = ReportConfig::for_results_dir(dir.path());
    assert!(matches!(
        report::build_facts(&cfg),
        Err(ReportError::NoSnapshotsFound { .. })
    ));
    assert!(matches!(
        SnapshotRepository::from_config(&cfg).find_latest(),
        Err(ReportError::NoSnapshotsFound { .. })
    ));
}

#[test]
fn test_unknown_target() {
    let dir = tempdir().unwrap();
    synth::write_history(dir.path(), &GenerateConfig::default(), MARKER).unwrap();
    let cfg = ReportConfig {
        target: Some("42".into()),
        ..ReportConfig::for_results_dir(dir.path())
    };
    assert!(matches!(
        report::build_facts(&cfg),
        Err(ReportError::SnapshotNotFound { .. })
    ));
}
