//! Pedgraph CLI: build, classify and query pedigree graphs.
//!
//! Usage:
//!   pedgraph build --csv ped.csv [--sep ,] [--no-header] [--strict]
//!   pedgraph classify
//!   pedgraph reconstruct (--probands 5,3 | --probands-file ids.txt) --out genealogy.csv
//!   pedgraph export --out all.csv
//!   pedgraph stats [--json]
//!
//! Every subcommand accepts `--db path`, `--config file.yaml`, `--sentinel id`
//! and `-v`. The sentinel is not stored in the graph, so pass the same one
//! to `build`, `reconstruct` and `export`.

use clap::{Args, Parser, Subcommand};
use pedgraph::pedfile::{parse_proband_list, read_proband_file};
use pedgraph::{PedGraph, PedigreeConfig, PedigreeResult, PersonId, SqliteStore};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pedgraph",
    version,
    about = "Multidimensional network database for pedigree analysis"
)]
struct Cli {
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Identifier meaning "parent unknown"
    #[arg(long, global = true)]
    sentinel: Option<String>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a pedigree file into the graph, then label founders and leaves
    Build {
        /// Pedigree file with columns ind, father, mother, sex
        #[arg(long)]
        csv: PathBuf,
        #[command(flatten)]
        format: FormatArgs,
        /// Fail on conflicting duplicate records instead of overwriting
        #[arg(long)]
        strict: bool,
    },
    /// Recompute founder and leaf labels
    Classify,
    /// Write the genealogy of a set of probands
    Reconstruct {
        /// Comma-separated proband identifiers
        #[arg(long, conflicts_with = "probands_file", required_unless_present = "probands_file")]
        probands: Option<String>,
        /// File with one proband identifier per line
        #[arg(long)]
        probands_file: Option<PathBuf>,
        /// Output pedigree file; must not exist
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Write every individual in the graph
    Export {
        /// Output pedigree file; must not exist
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Print node and relation counts
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct FormatArgs {
    /// Field separator
    #[arg(long)]
    sep: Option<char>,
    /// The file has no header line
    #[arg(long)]
    no_header: bool,
}

impl FormatArgs {
    fn apply(&self, mut config: PedigreeConfig) -> PedigreeConfig {
        if let Some(sep) = self.sep {
            config.format.separator = sep;
        }
        if self.no_header {
            config.format.header = false;
        }
        config
    }
}

/// Get the default database path (~/.local/share/pedgraph/pedgraph.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let pedgraph_dir = data_dir.join("pedgraph");
    std::fs::create_dir_all(&pedgraph_dir).ok();
    pedgraph_dir.join("pedgraph.db")
}

fn init_logging(verbose: bool) {
    let default = if verbose { "pedgraph=debug" } else { "pedgraph=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// The configuration file, if any, overridden by global flags
fn load_config(path: Option<&Path>, sentinel: Option<String>) -> PedigreeResult<PedigreeConfig> {
    let mut config = match path {
        Some(path) => PedigreeConfig::load(path)?,
        None => PedigreeConfig::default(),
    };
    if let Some(sentinel) = sentinel {
        config.sentinel = sentinel;
    }
    Ok(config)
}

fn open_graph(db: Option<PathBuf>, config: PedigreeConfig) -> PedigreeResult<PedGraph<SqliteStore>> {
    let db_path = db.unwrap_or_else(default_db_path);
    info!("Opening database {}", db_path.display());
    PedGraph::open(&db_path, config)
}

/// Run a command against the graph, closing it afterwards
fn with_graph<F>(db: Option<PathBuf>, config: PedigreeConfig, f: F) -> i32
where
    F: FnOnce(&PedGraph<SqliteStore>) -> PedigreeResult<()>,
{
    let graph = match open_graph(db, config) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error: failed to open database: {}", e);
            return 1;
        }
    };
    let result = f(&graph).and_then(|_| graph.close());
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_build(graph: &PedGraph<SqliteStore>, csv: &Path) -> PedigreeResult<()> {
    let report = graph.build(csv)?;
    println!(
        "Loaded {} rows: {} persons, {} relations ({} duplicates, {} founders, {} leaves)",
        report.ingestion.rows,
        report.stats.persons,
        report.stats.relations(),
        report.ingestion.duplicates(),
        report.stats.founders,
        report.stats.leaves
    );
    Ok(())
}

fn cmd_classify(graph: &PedGraph<SqliteStore>) -> PedigreeResult<()> {
    let report = graph.classify()?;
    println!("{} founders, {} leaves", report.founders, report.leaves);
    Ok(())
}

fn cmd_reconstruct(graph: &PedGraph<SqliteStore>, probands: &[PersonId], out: &Path) -> PedigreeResult<()> {
    let result = graph.reconstruct(probands)?;
    graph.write_csv(&result.genealogy, out)?;
    println!(
        "Wrote {} individuals ({} of {} probands found) to {}",
        result.report.individuals,
        result.report.probands_found,
        result.report.probands_requested,
        out.display()
    );
    Ok(())
}

fn cmd_export(graph: &PedGraph<SqliteStore>, out: &Path) -> PedigreeResult<()> {
    let genealogy = graph.export_all()?;
    graph.write_csv(&genealogy, out)?;
    println!("Wrote {} individuals to {}", genealogy.len(), out.display());
    Ok(())
}

fn cmd_stats(graph: &PedGraph<SqliteStore>, json: bool) -> PedigreeResult<()> {
    let stats = graph.stats()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("{:<10}  {:>10}", "NODES", "COUNT");
    println!("{}", "-".repeat(22));
    for (name, count) in [
        ("Person", stats.persons),
        ("Female", stats.females),
        ("Male", stats.males),
        ("Founder", stats.founders),
        ("Leaf", stats.leaves),
    ] {
        println!("{:<10}  {:>10}", name, count);
    }
    println!();
    println!("{:<10}  {:>10}", "RELATIONS", "COUNT");
    println!("{}", "-".repeat(22));
    for (name, count) in [
        ("is_child", stats.is_child),
        ("is_father", stats.is_father),
        ("is_mother", stats.is_mother),
        ("is_parent", stats.is_parent),
    ] {
        println!("{:<10}  {:>10}", name, count);
    }
    Ok(())
}

fn proband_ids(list: Option<&str>, file: Option<&Path>) -> PedigreeResult<Vec<PersonId>> {
    match (list, file) {
        (Some(list), _) => Ok(parse_proband_list(list)),
        (None, Some(file)) => read_proband_file(file),
        (None, None) => Ok(Vec::new()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref(), cli.sentinel) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Build { csv, format, strict } => {
            let mut config = format.apply(config);
            config.strict |= strict;
            with_graph(cli.db, config, |graph| cmd_build(graph, &csv))
        }
        Commands::Classify => with_graph(cli.db, config, cmd_classify),
        Commands::Reconstruct {
            probands,
            probands_file,
            out,
            format,
        } => {
            let config = format.apply(config);
            with_graph(cli.db, config, |graph| {
                let ids = proband_ids(probands.as_deref(), probands_file.as_deref())?;
                cmd_reconstruct(graph, &ids, &out)
            })
        }
        Commands::Export { out, format } => {
            let config = format.apply(config);
            with_graph(cli.db, config, |graph| cmd_export(graph, &out))
        }
        Commands::Stats { json } => with_graph(cli.db, config, |graph| cmd_stats(graph, json)),
    };
    std::process::exit(code);
}
