//! # tableqa CLI (`tqa`)
//!
//! ## Usage
//!
//! ```bash
//! tqa --config ./config/tqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tqa decompose <csv>` | Print one mini-table per cell |
//! | `tqa generate <csv>` | Write the question/expected-answer table |
//! | `tqa index <csv>` | Index every cell in the configured store |
//! | `tqa query "<text>"` | Ask the store directly |
//! | `tqa eval <csv>` | Run the evaluation harness |
//! | `tqa completions <shell>` | Print shell completions |
//!
//! ## Examples
//!
//! ```bash
//! tqa generate fruit.csv --template '$index_label的$column_label是什么？'
//! tqa index fruit.csv --recreate
//! tqa eval fruit.csv --out results/fruit.csv --concurrency 8
//! tqa eval fruit.csv --format json
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use tableqa::config;
use tableqa::eval::{self, EvalOptions};
use tableqa::export::EvalFormat;
use tableqa::{generate, ingest, logging, search};

/// tableqa: measure how well a search backend retrieves single table cells.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/tqa.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "tqa",
    about = "Measure how well a search backend retrieves single table cells",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/tqa.toml`, where a missing file means
    /// built-in defaults. A file named here must exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the fact units of a table.
    ///
    /// Each cell becomes a mini-table headed by its attribute. Bare mode
    /// puts the entity label and the value on two rows; with
    /// `table.entity_label` set it is one row under `[label, attribute]`.
    Decompose {
        /// Delimited file with a header row and a leading label column.
        path: PathBuf,

        /// Print one JSON object per unit instead of mini-tables.
        #[arg(long)]
        json: bool,
    },

    /// Write the question / expected-answer table as CSV.
    Generate {
        path: PathBuf,

        /// Question template; overrides `questions.template`.
        #[arg(long)]
        template: Option<String>,

        /// Output file (stdout if omitted).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Index every cell of a table in the configured store.
    Index {
        path: PathBuf,

        /// Drop the existing index first.
        #[arg(long)]
        recreate: bool,
    },

    /// Query the configured store and print the matching units.
    Query {
        text: String,

        /// Number of units to return; overrides `store.top_k`.
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Evaluate retrieval over every cell of a table.
    ///
    /// The in-memory store is always indexed first. For other stores pass
    /// `--reindex` or run `tqa index` beforehand.
    Eval {
        path: PathBuf,

        /// Question template; overrides `questions.template`.
        #[arg(long)]
        template: Option<String>,

        /// Output file (stdout if omitted).
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "csv")]
        format: EvalFormat,

        /// Questions in flight at once; overrides `evaluation.concurrency`.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Drop and rebuild the index before evaluating.
        #[arg(long)]
        reindex: bool,
    },

    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "tqa", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Decompose { path, json } => {
            generate::run_decompose(&cfg, &path, json)?;
        }
        Commands::Generate {
            path,
            template,
            out,
        } => {
            generate::run_generate(&cfg, &path, template.as_deref(), out.as_deref())?;
        }
        Commands::Index { path, recreate } => {
            ingest::run_index(&cfg, &path, recreate).await?;
        }
        Commands::Query { text, top_k } => {
            search::run_query(&cfg, &text, top_k).await?;
        }
        Commands::Eval {
            path,
            template,
            out,
            format,
            concurrency,
            reindex,
        } => {
            let opts = EvalOptions {
                template,
                output: out,
                format,
                concurrency,
                reindex,
            };
            eval::run_eval(&cfg, &path, opts).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
