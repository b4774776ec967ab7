use clap::Parser;
use env_logger::{Builder, Env};
use log::{error, info};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use stratum_common::{Result, StorageConfig, StratumError};
use stratum_query::{QueryEngine, QueryResult};
use stratum_record::Database;

#[derive(Parser, Debug)]
#[command(
    name = "stratum",
    version,
    about = "Typed tables on slotted-page heap files"
)]
struct Cli {
    /// JSON schema document describing the tables.
    #[arg(long)]
    schema: PathBuf,

    /// JSON storage configuration; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the heap files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Skip fsync after page writes.
    #[arg(long)]
    no_fsync: bool,

    /// Statement to run; may be repeated. Without it, statements are read
    /// from stdin, one per line.
    #[arg(short = 'e', long = "execute")]
    execute: Vec<String>,
}

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn load_config(cli: &Cli) -> Result<StorageConfig> {
    let mut config = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => StorageConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if cli.no_fsync {
        config.fsync_enabled = false;
    }
    if config.heap_extension.is_empty() {
        return Err(StratumError::ConfigError(
            "heap_extension must not be empty".to_string(),
        ));
    }
    Ok(config)
}

fn print_result(out: &mut impl Write, result: &QueryResult) -> io::Result<()> {
    match result {
        QueryResult::Inserted(id) => writeln!(out, "inserted {}", id),
        QueryResult::Rows(rows) => {
            for row in rows {
                writeln!(out, "{}", row)?;
            }
            writeln!(out, "({} row{})", rows.len(), if rows.len() == 1 { "" } else { "s" })
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let db = Database::open_with_schema_file(config, &cli.schema)?;
    let engine = QueryEngine::new(db);
    let mut out = io::stdout().lock();

    if !cli.execute.is_empty() {
        for query in &cli.execute {
            let result = engine.execute(query)?;
            print_result(&mut out, &result)?;
        }
        return Ok(());
    }

    let mut failures = 0usize;
    for line in io::stdin().lock().lines() {
        let line = line?;
        let query = line.trim();
        if query.is_empty() || query.starts_with("--") {
            continue;
        }
        match engine.execute(query) {
            Ok(result) => print_result(&mut out, &result)?,
            Err(e) => {
                failures += 1;
                error!("{}", e);
            }
        }
    }

    if failures > 0 {
        info!("{} statement(s) failed", failures);
    }
    Ok(())
}

fn main() {
    init_logger();

    if let Err(e) = run(Cli::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}
