//! Report assembly: derives the report facts from a results directory and
//! hands them to a [`Renderer`] as a flat key/value context.

pub mod chart;
pub mod html;
pub mod table;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{self, Ranking};
use crate::compare::{self, Comparison};
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::normalize::{normalize, NormalizedSnapshot, NormalizedTest};
use crate::scanner::{self, SnapshotRepository};
use crate::schema::Snapshot;
use crate::series::{self, Series};
use crate::OutputFormat;

pub use html::HtmlRenderer;

pub const TEMPLATE_ID: &str = "energy-report";

/// Minimum number of runs before the energy-over-time chart is drawn.
pub const MIN_RUNS_FOR_SERIES: usize = 3;
/// Minimum number of runs before a comparison is attempted.
pub const MIN_RUNS_FOR_COMPARISON: usize = 2;

/// A value a template can consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    Number(f64),
    /// Whole counts, rendered without decimals.
    Count(u64),
    /// Plain text; escaped by the renderer.
    Text(String),
    /// Pre-rendered markup, inserted verbatim.
    Markup(String),
    Flag(bool),
    List(Vec<ContextValue>),
}

impl From<f64> for ContextValue {
    fn from(v: f64) -> Self {
        ContextValue::Number(v)
    }
}

impl From<usize> for ContextValue {
    fn from(v: usize) -> Self {
        ContextValue::Count(v as u64)
    }
}

impl From<u64> for ContextValue {
    fn from(v: u64) -> Self {
        ContextValue::Count(v)
    }
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        ContextValue::Flag(v)
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        ContextValue::Text(v)
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        ContextValue::Text(v.to_string())
    }
}

impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(v: Vec<T>) -> Self {
        ContextValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// Named values handed to a renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReportContext {
    values: BTreeMap<String, ContextValue>,
}

impl ReportContext {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    /// Missing keys read as unset.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(ContextValue::Flag(true)))
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key) {
            Some(ContextValue::Number(n)) => Some(*n),
            Some(ContextValue::Count(n)) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> &[ContextValue] {
        match self.get(key) {
            Some(ContextValue::List(items)) => items,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Turns a context into a finished document.
pub trait Renderer {
    fn render(&self, template: &str, context: &ReportContext) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Ranking,
    OverTime,
    Comparison,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OmittedSection {
    pub section: Section,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub number_of_tests: usize,
    pub number_of_repeats: u64,
    pub execution_timestamp: i64,
    pub revision: Option<String>,
    /// Per-iteration values from here on.
    pub total_energy: f64,
    pub total_time: Option<f64>,
    pub overhead_energy: Option<f64>,
    pub overhead_time: Option<f64>,
}

impl Summary {
    fn of(s: &NormalizedSnapshot) -> Self {
        Self {
            number_of_tests: s.tests.len(),
            number_of_repeats: s.number_of_repeats.get(),
            execution_timestamp: s.execution_timestamp,
            revision: s.revision.clone(),
            total_energy: s.total_consumption,
            total_time: s.total_time,
            overhead_energy: s.overhead_energy,
            overhead_time: s.overhead_time,
        }
    }
}

/// Everything the report shows, derived from normalized snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFacts {
    pub snapshot_file: String,
    pub snapshots_found: usize,
    pub top_n: usize,
    pub summary: Summary,
    /// Every test of the target run, ascending by energy.
    pub all_tests: Vec<NormalizedTest>,
    pub ranking: Option<Ranking>,
    pub series: Option<Series>,
    pub comparison: Option<Comparison>,
    pub omitted: Vec<OmittedSection>,
}

fn recover<T>(
    section: Section,
    result: Result<T>,
    omitted: &mut Vec<OmittedSection>,
) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_section_recoverable() => {
            warn!(?section, error = %e, "omitting report section");
            omitted.push(OmittedSection {
                section,
                reason: e.to_string(),
            });
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn skip(section: Section, reason: String, omitted: &mut Vec<OmittedSection>) {
    info!(?section, %reason, "skipping report section");
    omitted.push(OmittedSection { section, reason });
}

/// The run a report is about: the one named by `target`, or the latest of
/// `all` when no target is given. `all` must come from `repo.load_all()`.
pub fn select_target<'a>(
    repo: &SnapshotRepository,
    all: &'a [Snapshot],
    target: Option<&str>,
) -> Result<&'a Snapshot> {
    match target {
        Some(id) => {
            let name = repo.find_by_id(id)?;
            all.iter()
                .find(|s| s.file_name == name)
                .ok_or(ReportError::SnapshotNotFound { id: name })
        }
        None => scanner::latest_of(all).ok_or_else(|| ReportError::NoSnapshotsFound {
            dir: repo.dir().to_path_buf(),
        }),
    }
}

/// Loads the results directory and derives every report fact.
///
/// Loading problems are fatal. Ranking and comparison problems only drop
/// their section, recorded in [`ReportFacts::omitted`].
pub fn build_facts(cfg: &ReportConfig) -> Result<ReportFacts> {
    let repo = SnapshotRepository::from_config(cfg);
    let all = repo.load_all()?;
    let target = select_target(&repo, &all, cfg.target.as_deref())?;
    info!(file = %target.file_name, runs = all.len(), "building report");

    let current = normalize(target);
    let mut omitted = Vec::new();

    let mut all_tests = aggregate::sorted_descending(&current);
    all_tests.reverse();

    let ranking = recover(
        Section::Ranking,
        aggregate::rank(&current, cfg.top_n),
        &mut omitted,
    )?;

    let series = if all.len() >= MIN_RUNS_FOR_SERIES {
        let normalized: Vec<NormalizedSnapshot> = all.iter().map(normalize).collect();
        Some(series::build_series(&normalized))
    } else {
        skip(
            Section::OverTime,
            format!("needs at least {MIN_RUNS_FOR_SERIES} runs, found {}", all.len()),
            &mut omitted,
        );
        None
    };

    let comparison = if all.len() >= MIN_RUNS_FOR_COMPARISON {
        let compared = compare::select_previous(target, &all)
            .and_then(|previous| compare::compare(&current, &normalize(previous)));
        recover(Section::Comparison, compared, &mut omitted)?
    } else {
        skip(
            Section::Comparison,
            format!("needs at least {MIN_RUNS_FOR_COMPARISON} runs, found {}", all.len()),
            &mut omitted,
        );
        None
    };

    Ok(ReportFacts {
        snapshot_file: target.file_name.clone(),
        snapshots_found: all.len(),
        top_n: cfg.top_n,
        summary: Summary::of(&current),
        all_tests,
        ranking,
        series,
        comparison,
        omitted,
    })
}

impl ReportFacts {
    /// Flattens the facts into the key/value contract of [`Renderer`].
    pub fn to_context(&self) -> ReportContext {
        let mut ctx = ReportContext::default();
        ctx.insert("title", "Coppers test energy usage");
        ctx.insert("snapshot_file", self.snapshot_file.as_str());
        ctx.insert("number_of_tests", self.summary.number_of_tests);
        ctx.insert("number_of_repeats", self.summary.number_of_repeats);
        ctx.insert("total_energy", self.summary.total_energy);
        if let Some(v) = self.summary.total_time {
            ctx.insert("total_time", v);
        }
        if let Some(v) = self.summary.overhead_energy {
            ctx.insert("overhead_energy", v);
        }
        if let Some(v) = self.summary.overhead_time {
            ctx.insert("overhead_time", v);
        }

        ctx.insert("show_ranking", self.ranking.is_some());
        if let Some(r) = &self.ranking {
            ctx.insert("amount_top", self.top_n);
            ctx.insert(
                "most_energy_consuming_names",
                r.top.iter().map(|t| t.name.clone()).collect::<Vec<_>>(),
            );
            ctx.insert(
                "most_energy_consuming_usages",
                r.top.iter().map(|t| t.energy_uj).collect::<Vec<_>>(),
            );
            // Least consuming first.
            ctx.insert(
                "least_energy_consuming_names",
                r.bottom.iter().rev().map(|t| t.name.clone()).collect::<Vec<_>>(),
            );
            ctx.insert(
                "least_energy_consuming_usages",
                r.bottom.iter().rev().map(|t| t.energy_uj).collect::<Vec<_>>(),
            );
        }

        ctx.insert("over_time", self.series.is_some());
        if let Some(s) = &self.series {
            ctx.insert(
                "plot_energy_over_time",
                ContextValue::Markup(chart::line_chart(s)),
            );
        }

        ctx.insert("compare_to_last", self.comparison.is_some());
        if let Some(c) = &self.comparison {
            ctx.insert("previous_snapshot_file", c.previous_file.as_str());
            ctx.insert("overall_change", c.overall_delta);
            ctx.insert(
                "comparison_table",
                ContextValue::Markup(table::comparison_table(c)),
            );
        }

        ctx.insert(
            "omitted_sections",
            self.omitted.iter().map(|o| o.reason.clone()).collect::<Vec<_>>(),
        );
        ctx.insert("all_tests_plot", ContextValue::Markup(chart::bar_chart(&self.all_tests)));
        ctx
    }
}

/// Produces the output document for `cfg.format`.
pub fn render(cfg: &ReportConfig, facts: &ReportFacts, renderer: &dyn Renderer) -> Result<String> {
    match cfg.format {
        OutputFormat::Html => renderer.render(TEMPLATE_ID, &facts.to_context()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(facts)?),
    }
}

pub fn write_report(cfg: &ReportConfig, document: &str) -> Result<PathBuf> {
    fs::create_dir_all(&cfg.output_dir).map_err(|e| ReportError::io(&cfg.output_dir, e))?;
    let path = cfg.output_path();
    fs::write(&path, document).map_err(|e| ReportError::io(&path, e))?;
    info!(path = %path.display(), "wrote report");
    Ok(path)
}

/// Full pipeline with the bundled HTML renderer; returns the written path.
pub fn generate(cfg: &ReportConfig) -> Result<PathBuf> {
    let facts = build_facts(cfg)?;
    let document = render(cfg, &facts, &HtmlRenderer)?;
    write_report(cfg, &document)
}
