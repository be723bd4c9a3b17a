use clap::{Parser, Subcommand};
use coppers_report::config::{
    ReportConfig, DEFAULT_MARKER, DEFAULT_OUTPUT_DIR, DEFAULT_RESULTS_DIR, DEFAULT_TOP_N,
};
use coppers_report::report::{self, HtmlRenderer};
use coppers_report::scanner::SnapshotRepository;
use coppers_report::synth::{self, GenerateConfig};
use coppers_report::{compare, normalize, OutputFormat, ReportError};
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the energy report for one run (the latest by default).
    Report {
        /// Identifier at the end of the snapshot file name, e.g. its timestamp.
        #[arg(long, value_name = "ID")]
        target: Option<String>,

        /// How many tests to list as most / least energy consuming.
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,

        #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,

        /// Directory the report is written to.
        #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Print the document instead of writing it.
        #[arg(long, default_value_t = false)]
        stdout: bool,
    },

    /// Print the file name of the most recently executed run.
    Latest,

    /// List every snapshot file in the results directory.
    List,

    /// Compare a run against the one executed before it (JSON output).
    Compare {
        #[arg(long, value_name = "ID")]
        target: Option<String>,
    },

    /// Write a deterministic synthetic run history.
    ///
    /// Produces runner-format snapshot files, handy for trying the report
    /// without measuring anything.
    Generate {
        /// Output directory for the generated snapshots.
        #[arg(long, short = 'o', value_name = "DIR")]
        output: PathBuf,

        #[arg(long, default_value_t = 5)]
        runs: usize,

        #[arg(long, default_value_t = 12)]
        tests: usize,

        #[arg(long, default_value = "10")]
        repeats: NonZeroU64,

        /// Random seed for deterministic generation.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Parser, Debug)]
#[command(name = "coppers-report")]
#[command(about = "Energy-consumption report over coppers benchmark snapshots")]
struct Args {
    /// Directory holding the snapshot JSON files.
    #[arg(
        long,
        value_name = "DIR",
        env = "COPPERS_RESULTS_DIR",
        default_value = DEFAULT_RESULTS_DIR,
        global = true
    )]
    results_dir: PathBuf,

    /// Substring that marks a JSON file as a snapshot.
    #[arg(long, default_value = DEFAULT_MARKER, global = true)]
    marker: String,

    #[command(subcommand)]
    cmd: Command,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), ReportError> {
    let mut cfg = ReportConfig {
        results_dir: args.results_dir,
        marker: args.marker,
        ..Default::default()
    };
    let repo = SnapshotRepository::from_config(&cfg);

    match args.cmd {
        Command::Report {
            target,
            top_n,
            format,
            output_dir,
            stdout,
        } => {
            cfg.target = target;
            cfg.top_n = top_n;
            cfg.format = format;
            cfg.output_dir = output_dir;

            let facts = report::build_facts(&cfg)?;
            let document = report::render(&cfg, &facts, &HtmlRenderer)?;
            if stdout {
                println!("{document}");
            } else {
                let path = report::write_report(&cfg, &document)?;
                eprintln!("> Generated report of energy consumption results in {}", path.display());
            }
        }
        Command::Latest => {
            println!("{}", repo.find_latest()?);
        }
        Command::List => {
            for name in repo.list_snapshot_files()? {
                println!("{name}");
            }
        }
        Command::Compare { target } => {
            let all = repo.load_all()?;
            let current = report::select_target(&repo, &all, target.as_deref())?;
            let previous = compare::select_previous(current, &all)?;
            let comparison = compare::compare(
                &normalize::normalize(current),
                &normalize::normalize(previous),
            )?;
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        Command::Generate {
            output,
            runs,
            tests,
            repeats,
            seed,
        } => {
            let gen_config = GenerateConfig {
                runs,
                tests,
                repeats,
                seed,
                ..Default::default()
            };
            let written = synth::write_history(&output, &gen_config, &cfg.marker)?;
            eprintln!(
                "Wrote {} snapshots ({} tests, {} repeats, seed {}) to {}",
                written.len(),
                tests,
                repeats,
                seed,
                output.display()
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
