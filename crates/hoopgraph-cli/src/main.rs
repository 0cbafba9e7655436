// hoopgraph entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open database
// 4. Run the requested subcommand, printing JSON or plain lists to stdout

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use hoopgraph_charts::{Deadline, GraphOutcome, GraphPipeline, GraphRequest, PipelineSettings};
use hoopgraph_core::config;
use hoopgraph_core::db::Database;
use hoopgraph_core::import;
use hoopgraph_core::StatStore;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "hoopgraph",
    version,
    about = "Chart data from per-season basketball stats",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Override the configured database path")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Import NBA_<year>_per_game_stats.csv files into the database")]
    Import {
        #[arg(value_name = "CSV", help = "Files to import; defaults to every season file in the data directory")]
        files: Vec<PathBuf>,
    },

    #[command(about = "Build chart data from a JSON request ('-' reads stdin)")]
    Graph {
        #[arg(value_name = "REQUEST")]
        request: PathBuf,

        #[arg(long, help = "Wrap the payload with pipeline counters")]
        with_stats: bool,

        #[arg(long, value_name = "SECS", help = "Override the configured request timeout")]
        timeout: Option<u64>,
    },

    #[command(about = "List players, optionally filtered by a name fragment")]
    Players {
        #[arg(value_name = "SEARCH")]
        search: Option<String>,
    },

    #[command(about = "List team abbreviations")]
    Teams,

    #[command(about = "List seasons present in the database")]
    Years,

    #[command(about = "List award tokens in display order")]
    Awards,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    info!("hoopgraph starting: {:?}", cli.command);

    let config = config::load_config().context("failed to load configuration")?;
    let db_path = match &cli.db {
        Some(path) => path.display().to_string(),
        None => config.database.path.clone(),
    };
    let db = Database::open(&db_path).context("failed to open database")?;
    info!("Database opened at {}", db_path);

    match cli.command {
        Command::Import { files } => {
            let files = if files.is_empty() {
                let dir = Path::new(&config.data.csv_dir);
                import::find_season_files(dir)
                    .with_context(|| format!("failed to scan {}", dir.display()))?
            } else {
                files
            };
            let imported = import_files(&db, &files)?;
            println!("imported {imported} rows from {} files", files.len());
        }
        Command::Graph {
            request,
            with_stats,
            timeout,
        } => {
            let request = read_request(&request)?;
            let timeout = Duration::from_secs(timeout.unwrap_or(config.pipeline.request_timeout_secs));
            let outcome = run_graph(db, request, PipelineSettings::from_config(&config), timeout).await?;
            let json = if with_stats {
                serde_json::to_string_pretty(&outcome)?
            } else {
                serde_json::to_string_pretty(&outcome.payload)?
            };
            println!("{json}");
        }
        Command::Players { search } => {
            let names = db.search_players(search.as_deref().unwrap_or(""))?;
            print_lines(names);
        }
        Command::Teams => print_lines(db.team_names()?),
        Command::Years => print_lines(db.years()?),
        Command::Awards => {
            let pipeline = GraphPipeline::new(&db, PipelineSettings::from_config(&config));
            print_lines(pipeline.award_options(None)?);
        }
    }

    Ok(())
}

fn print_lines<T: std::fmt::Display>(items: Vec<T>) {
    for item in items {
        println!("{item}");
    }
}

/// Import each season file, continuing past files that fail to parse.
fn import_files(db: &Database, files: &[PathBuf]) -> anyhow::Result<usize> {
    if files.is_empty() {
        warn!("no season files to import");
        return Ok(0);
    }
    let mut total = 0;
    for path in files {
        match import::load_season_file(path) {
            Ok(records) => {
                total += db
                    .insert_records(&records)
                    .with_context(|| format!("failed to store rows from {}", path.display()))?;
            }
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }
    info!("Imported {} rows from {} files", total, files.len());
    Ok(total)
}

fn read_request(path: &Path) -> anyhow::Result<GraphRequest> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request {}", path.display()))?
    };
    serde_json::from_str(&text).context("request is not valid JSON")
}

/// Run one build on the blocking pool, bounded by `timeout`. The same bound
/// is passed down as the store-call deadline.
async fn run_graph(
    store: Database,
    request: GraphRequest,
    settings: PipelineSettings,
    timeout: Duration,
) -> anyhow::Result<GraphOutcome> {
    let deadline = Deadline::after(timeout);
    let task = tokio::task::spawn_blocking(move || {
        GraphPipeline::new(&store, settings).build(&request, Some(deadline))
    });
    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => Ok(joined.context("graph build task panicked")??),
        Err(_) => bail!("graph build exceeded {}s", timeout.as_secs()),
    }
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("hoopgraph.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hoopgraph=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
