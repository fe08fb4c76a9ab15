//! pypi-recom CLI - scrape PyPI search results into a package graph

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pypi-recom")]
#[command(version)]
#[command(about = "Build a package relationship graph from PyPI search results")]
#[command(long_about = r#"
pypi-recom searches PyPI for a phrase, stages metadata of the packages found
as CSV tables and loads them into a TigerGraph dataset.

Example usage:
  pypi-recom init
  PYPI_RECOM_GRAPH_SECRET=... pypi-recom run the data science
  pypi-recom graph data science
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of human output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the search context derived from a phrase
    Context {
        /// Search phrase
        #[arg(required = true)]
        phrase: Vec<String>,
    },

    /// List package names found on the search result pages
    Scrape {
        #[arg(required = true)]
        phrase: Vec<String>,

        /// Number of result pages (defaults to the config value)
        #[arg(short, long)]
        pages: Option<u32>,
    },

    /// Fetch and print the normalized metadata of one package
    Fetch {
        /// Package name
        package: String,
    },

    /// Scrape, stage and load a search phrase into the graph
    Run {
        #[arg(required = true)]
        phrase: Vec<String>,

        /// Number of result pages (defaults to the config value)
        #[arg(short, long)]
        pages: Option<u32>,

        /// Load into an in-memory graph instead of the remote store
        #[arg(long)]
        dry_run: bool,
    },

    /// Load the staged tables of a search phrase into the graph
    Load {
        #[arg(required = true)]
        phrase: Vec<String>,

        /// Load into an in-memory graph instead of the remote store
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the cached graph snapshot of a search phrase
    Graph {
        #[arg(required = true)]
        phrase: Vec<String>,
    },

    /// List every search context processed so far
    Index,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mode = commands::OutputMode::from_flag(cli.json);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init { force } => commands::run_init(config_path, force, mode),
        Commands::Context { phrase } => commands::run_context(&phrase, mode),
        Commands::Scrape { phrase, pages } => {
            let config = pypi_recom::config::load_config(config_path)?;
            commands::run_scrape(&config, &phrase, pages, mode)
        }
        Commands::Fetch { package } => {
            let config = pypi_recom::config::load_config(config_path)?;
            commands::run_fetch(&config, &package, mode)
        }
        Commands::Run { phrase, pages, dry_run } => {
            let config = pypi_recom::config::load_config(config_path)?;
            commands::run_pipeline(&config, &phrase, pages, dry_run, mode)
        }
        Commands::Load { phrase, dry_run } => {
            let config = pypi_recom::config::load_config(config_path)?;
            commands::run_load(&config, &phrase, dry_run, mode)
        }
        Commands::Graph { phrase } => {
            let config = pypi_recom::config::load_config(config_path)?;
            commands::run_graph(&config, &phrase)
        }
        Commands::Index => {
            let config = pypi_recom::config::load_config(config_path)?;
            commands::run_index(&config, mode)
        }
    }
}
