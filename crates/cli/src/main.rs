use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use nayose_import::NameKind;

mod commands;

#[derive(Parser)]
#[command(name = "nayose")]
#[command(about = "Reconcile counterparty and department names between ledger exports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with matcher weights, n-gram size, top_n and threshold
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Override the configured number of suggestions
    #[arg(long, global = true)]
    top_n: Option<usize>,

    /// Override the configured minimum score
    #[arg(long, global = true)]
    threshold: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score two names against each other and print every component
    Score { a: String, b: String },

    /// Rank master-list names for a single query
    Suggest {
        query: String,

        /// Target-ledger journal export(s) to build the master list from
        #[arg(long, short, required = true, num_args = 1..)]
        master: Vec<PathBuf>,

        /// Which master list to search: partners or departments
        #[arg(long, short, default_value = "partners")]
        kind: NameKind,
    },

    /// Annotate a source export with suggestions for every row
    Reconcile {
        /// Source-ledger export to annotate
        #[arg(long, short)]
        source: PathBuf,

        /// Target-ledger journal export(s) to build the master lists from
        #[arg(long, short, required = true, num_args = 1..)]
        master: Vec<PathBuf>,

        /// Where to write the annotated CSV (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match commands::load_config(cli.config.as_deref(), cli.top_n, cli.threshold) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Score { a, b } => commands::score(&config, &a, &b),
        Commands::Suggest {
            query,
            master,
            kind,
        } => commands::suggest(&config, &query, &master, kind),
        Commands::Reconcile {
            source,
            master,
            output,
        } => commands::reconcile(&config, &source, &master, output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
