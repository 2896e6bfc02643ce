//! docqa CLI entry point

use clap::{Parser, Subcommand};
use docqa::{
    commands::{
        cmd_ingest, cmd_init, cmd_purge, cmd_query, cmd_status, print_answer,
        print_ingest_result, print_purge_result, print_status,
    },
    config::Config,
    error::{Error, Result},
    store::ChunkStore,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docqa")]
#[command(version, about = "Grounded question answering over PDF corpora", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize docqa configuration and database
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Ingest a PDF document, replacing any previous version
    Ingest {
        /// Path to the PDF file
        file: PathBuf,

        /// Document identifier (defaults to the file stem)
        #[arg(short, long)]
        doc_id: Option<String>,
    },

    /// Ask a question grounded in the ingested corpus
    Query {
        /// The question to answer
        question: String,

        /// Number of chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Delete every stored chunk
    Purge {
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show corpus status
    Status,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Handle init specially (doesn't need existing config)
    if let Commands::Init { force } = &cli.command {
        let force = *force;
        let base_dir = cli
            .config
            .as_deref()
            .and_then(|p| p.parent())
            .map(PathBuf::from);
        let config = cmd_init(base_dir, force).await?;

        println!("✓ docqa initialized successfully");
        println!("  Config: {}", config.paths.config_file.display());
        println!("\nNext steps:");
        println!("  1. Edit the config file to customize settings");
        println!("  2. Export your API key: export OPENAI_API_KEY=...");
        println!("  3. Ingest a document: docqa ingest report.pdf");
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let store = ChunkStore::connect(&config).await?;

    // Commands are cancellable; the store's transactions roll back on drop
    tokio::select! {
        result = execute(cli.command, &config, &store, cli.json) => result,
        _ = tokio::signal::ctrl_c() => Err(Error::Cancelled),
    }
}

async fn execute(
    command: Commands,
    config: &Config,
    store: &ChunkStore,
    json: bool,
) -> Result<()> {
    match command {
        Commands::Init { .. } => unreachable!(),

        Commands::Ingest { file, doc_id } => {
            let result = cmd_ingest(config, store, &file, doc_id).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_ingest_result(&result);
            }
        }

        Commands::Query { question, top_k } => {
            let result = cmd_query(config, store, &question, top_k).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_answer(&question, &result);
            }
        }

        Commands::Purge { yes } => {
            if !yes {
                eprintln!("⚠️  This will delete ALL indexed data!");
                eprintln!("Run with --yes to confirm.");
                std::process::exit(1);
            }

            let result = cmd_purge(store).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_purge_result(&result);
            }
        }

        Commands::Status => {
            let status = cmd_status(config, store).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(p) => Config::load(p),
        None => {
            let default_path = Config::default_config_path();
            if default_path.exists() {
                Config::load(&default_path)
            } else {
                Err(Error::Config(
                    "No config found. Run 'docqa init' first.".to_string(),
                ))
            }
        }
    }
}
