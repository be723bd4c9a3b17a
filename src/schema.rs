use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::num::NonZeroU64;

/// Revision identifier as written by the runner: either a hex string or the
/// raw hash bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRevision {
    Hex(String),
    Bytes(Vec<u8>),
}

impl RawRevision {
    pub fn to_hex(&self) -> String {
        match self {
            RawRevision::Hex(s) => s.to_ascii_lowercase(),
            RawRevision::Bytes(bytes) => hex::encode(bytes),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTest {
    pub name: String,
    #[serde(alias = "energyMicrojoules")]
    pub uj: f64,
    #[serde(alias = "timeMicroseconds")]
    pub us: f64,
}

/// On-disk snapshot record. Field names follow the runner's writer; the
/// aliases cover older and camel-cased files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSnapshot {
    #[serde(alias = "timestamp", alias = "executionTimestamp")]
    pub execution_timestamp: i64,
    #[serde(default, alias = "commitTimestamp", skip_serializing_if = "Option::is_none")]
    pub commit_timestamp: Option<i64>,
    #[serde(default, alias = "revisionId", skip_serializing_if = "Option::is_none")]
    pub head: Option<RawRevision>,
    #[serde(alias = "numberOfRepeats")]
    pub number_of_repeats: i64,
    #[serde(
        default,
        alias = "total_consumption",
        alias = "totalConsumption",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_uj: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_us: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overhead_uj: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overhead_us: Option<f64>,
    pub tests: Vec<RawTest>,
}

/// One test's raw measurement, accumulated over all repeats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub name: String,
    pub energy_uj: f64,
    pub time_us: f64,
}

/// One benchmark run with validated fields. Energy and time values are the
/// raw repeat-summed totals; see [`crate::normalize`] for per-iteration views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub file_name: String,
    pub execution_timestamp: i64,
    pub commit_timestamp: Option<i64>,
    /// Lowercase hex.
    pub revision: Option<String>,
    pub number_of_repeats: NonZeroU64,
    pub total_consumption: f64,
    pub total_time: Option<f64>,
    pub overhead_energy: Option<f64>,
    pub overhead_time: Option<f64>,
    pub tests: Vec<TestResult>,
}

impl Snapshot {
    /// Validates a raw record. The error string is the reason only; callers
    /// attach the file path.
    pub fn from_raw(file_name: impl Into<String>, raw: RawSnapshot) -> Result<Self, String> {
        let repeats = u64::try_from(raw.number_of_repeats)
            .ok()
            .and_then(NonZeroU64::new)
            .ok_or_else(|| {
                format!(
                    "number_of_repeats must be positive, got {}",
                    raw.number_of_repeats
                )
            })?;

        let mut seen = HashSet::with_capacity(raw.tests.len());
        for t in &raw.tests {
            if !seen.insert(t.name.as_str()) {
                return Err(format!("duplicate test name {:?}", t.name));
            }
            if !t.uj.is_finite() || !t.us.is_finite() {
                return Err(format!("test {:?} has a non-finite measurement", t.name));
            }
        }

        let tests: Vec<TestResult> = raw
            .tests
            .into_iter()
            .map(|t| TestResult {
                name: t.name,
                energy_uj: t.uj,
                time_us: t.us,
            })
            .collect();

        let total_consumption = raw
            .total_uj
            .unwrap_or_else(|| tests.iter().map(|t| t.energy_uj).sum());

        Ok(Self {
            file_name: file_name.into(),
            execution_timestamp: raw.execution_timestamp,
            commit_timestamp: raw.commit_timestamp,
            revision: raw.head.map(|h| h.to_hex()),
            number_of_repeats: repeats,
            total_consumption,
            total_time: raw.total_us,
            overhead_energy: raw.overhead_uj,
            overhead_time: raw.overhead_us,
            tests,
        })
    }

    pub fn to_raw(&self) -> RawSnapshot {
        RawSnapshot {
            execution_timestamp: self.execution_timestamp,
            commit_timestamp: self.commit_timestamp,
            head: self.revision.clone().map(RawRevision::Hex),
            number_of_repeats: self.number_of_repeats.get() as i64,
            total_uj: Some(self.total_consumption),
            total_us: self.total_time,
            overhead_uj: self.overhead_energy,
            overhead_us: self.overhead_time,
            tests: self
                .tests
                .iter()
                .map(|t| RawTest {
                    name: t.name.clone(),
                    uj: t.energy_uj,
                    us: t.time_us,
                })
                .collect(),
        }
    }

    pub fn test(&self, name: &str) -> Option<&TestResult> {
        self.tests.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawSnapshot {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_runner_field_names() {
        let r = raw(r#"{
            "timestamp": 1700000000,
            "head": "ABCDEF0123",
            "total_us": 900,
            "total_uj": 1200,
            "overhead_us": 100,
            "overhead_uj": 200,
            "number_of_repeats": 2,
            "tests": [{"name": "sort", "uj": 600, "us": 400}]
        }"#);
        let s = Snapshot::from_raw("coppers_results-1700000000.json", r).unwrap();
        assert_eq!(s.execution_timestamp, 1_700_000_000);
        assert_eq!(s.revision.as_deref(), Some("abcdef0123"));
        assert_eq!(s.number_of_repeats.get(), 2);
        assert_eq!(s.total_consumption, 1200.0);
        assert_eq!(s.overhead_energy, Some(200.0));
        assert_eq!(s.tests[0].energy_uj, 600.0);
    }

    #[test]
    fn test_camel_case_and_byte_revision() {
        let r = raw(r#"{
            "executionTimestamp": 5,
            "commitTimestamp": 3,
            "revisionId": [222, 173, 190, 239],
            "numberOfRepeats": 1,
            "totalConsumption": 10.5,
            "tests": []
        }"#);
        let s = Snapshot::from_raw("x.json", r).unwrap();
        assert_eq!(s.commit_timestamp, Some(3));
        assert_eq!(s.revision.as_deref(), Some("deadbeef"));
        assert_eq!(s.total_consumption, 10.5);
    }

    #[test]
    fn test_total_defaults_to_sum_of_tests() {
        let r = raw(r#"{
            "execution_timestamp": 1,
            "number_of_repeats": 1,
            "tests": [{"name": "a", "uj": 2, "us": 1}, {"name": "b", "uj": 3, "us": 1}]
        }"#);
        let s = Snapshot::from_raw("x.json", r).unwrap();
        assert_eq!(s.total_consumption, 5.0);
    }

    #[test]
    fn test_zero_repeats_rejected() {
        let r = raw(r#"{"execution_timestamp": 1, "number_of_repeats": 0, "tests": []}"#);
        let err = Snapshot::from_raw("x.json", r).unwrap_err();
        assert!(err.contains("number_of_repeats"));

        let r = raw(r#"{"execution_timestamp": 1, "number_of_repeats": -4, "tests": []}"#);
        assert!(Snapshot::from_raw("x.json", r).is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let r = raw(r#"{
            "execution_timestamp": 1,
            "number_of_repeats": 1,
            "tests": [{"name": "a", "uj": 2, "us": 1}, {"name": "a", "uj": 3, "us": 1}]
        }"#);
        let err = Snapshot::from_raw("x.json", r).unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn test_to_raw_preserves_values() {
        let r = raw(r#"{
            "execution_timestamp": 9,
            "commit_timestamp": 8,
            "head": [1, 2],
            "number_of_repeats": 4,
            "total_uj": 40,
            "tests": [{"name": "a", "uj": 40, "us": 4}]
        }"#);
        let s = Snapshot::from_raw("x.json", r).unwrap();
        let back = Snapshot::from_raw("x.json", s.to_raw()).unwrap();
        assert_eq!(s, back);
    }
}
