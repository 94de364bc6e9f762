use crate::config::{DEFAULT_BATCH_SIZE, DEFAULT_GRAPH, EdgeMode, RunConfig};
use crate::progress::{ProgressSink, Silent, TerminalProgress};
use crate::report::{render_info, render_result_set};
use crate::run::{RunReport, run};
use crate::store::SqliteStore;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod bench;
pub mod config;
pub mod core;
pub mod error;
pub mod generate;
pub mod load;
pub mod progress;
pub mod queries;
pub mod report;
pub mod run;
pub mod store;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EdgeModeArg {
    PerEdge,
    PerHub,
}

impl From<EdgeModeArg> for EdgeMode {
    fn from(arg: EdgeModeArg) -> Self {
        match arg {
            EdgeModeArg::PerEdge => EdgeMode::PerEdge,
            EdgeModeArg::PerHub => EdgeMode::PerHub,
        }
    }
}

/// Seeds a social graph of persons and hub links, then benchmarks loading and querying it.
#[derive(Debug, Parser)]
#[command(name = "graphseed", version)]
struct Cli {
    /// Total number of persons to create.
    #[arg(default_value_t = 1000)]
    qty: u64,

    /// Number of hub persons. Defaults to 1% of qty, at least 3.
    #[arg(long)]
    prime: Option<u64>,

    #[arg(long, env = "GRAPHSEED_GRAPH", default_value = DEFAULT_GRAPH)]
    graph: String,

    /// SQLite database file.
    #[arg(long, env = "GRAPHSEED_DB", default_value = "graphseed.sqlite")]
    db: PathBuf,

    /// Use a throwaway in-memory database instead of --db.
    #[arg(long)]
    in_memory: bool,

    /// Persons staged per commit.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    #[arg(long, value_enum, default_value_t = EdgeModeArg::PerEdge)]
    edge_mode: EdgeModeArg,

    /// Seed for a reproducible dataset.
    #[arg(long)]
    seed: Option<u64>,

    /// Also write the summary to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Delete the graph once the run is done.
    #[arg(long)]
    cleanup: bool,

    /// No progress bars.
    #[arg(short, long)]
    quiet: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        let hubs = self
            .prime
            .unwrap_or_else(|| RunConfig::default_hubs(self.qty));
        let mut cfg = RunConfig::new(self.qty, hubs);
        cfg.graph = self.graph.clone();
        cfg.batch_size = self.batch_size;
        cfg.edge_mode = self.edge_mode.into();
        cfg.cleanup = self.cleanup;
        cfg
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_report<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    if report.deleted_existing {
        writeln!(out, "Existing graph deleted")?;
    }
    render_result_set(out, "Total number of links", &report.link_counts)?;
    if let Some((hub, connections)) = &report.connections {
        render_result_set(out, &format!("Connections of {hub}"), connections)?;
    }
    if let Some((hub, dated)) = &report.dated_links {
        writeln!(out, "\n{dated} dated link(s) found for {hub}")?;
    }
    render_info(out, &report.store_info)?;
    writeln!(out)?;
    report.summary.render(out)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = cli.run_config();
    cfg.validate().context("invalid arguments")?;

    let mut store = if cli.in_memory {
        SqliteStore::open_in_memory(&cfg.graph)
    } else {
        SqliteStore::open(&cli.db, &cfg.graph)
    }
    .with_context(|| format!("failed to open store at {}", cli.db.display()))?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut progress: Box<dyn ProgressSink> = if cli.quiet {
        Box::new(Silent)
    } else {
        Box::new(TerminalProgress::new())
    };

    info!(total = cfg.total, hubs = cfg.hubs, graph = %cfg.graph, "starting run");
    let report = run(
        &cfg,
        &mut store,
        &mut rng,
        || chrono::Utc::now().timestamp(),
        progress.as_mut(),
    )
    .context("benchmark run failed")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    print_report(&mut out, &report).context("failed to print report")?;
    out.flush()?;

    if let Some(path) = &cli.csv {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        report
            .summary
            .write_csv(file)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }

    Ok(())
}
