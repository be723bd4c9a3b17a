use clap::ValueEnum;

pub mod aggregate;
pub mod compare;
pub mod config;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod report;
pub mod scanner;
pub mod schema;
pub mod series;
pub mod synth;

pub use error::{ReportError, Result};

/// Output document kind.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Self-contained HTML page with inline SVG charts.
    #[default]
    Html,
    /// The derived report facts as pretty JSON.
    Json,
}

impl OutputFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFormat::Html => "index.html",
            OutputFormat::Json => "report.json",
        }
    }
}
