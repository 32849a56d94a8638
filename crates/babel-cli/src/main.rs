use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod app;
mod commands;
mod logging;

use app::{App, Settings};

#[derive(Parser)]
#[command(name = "babel")]
#[command(about = "Babel - translate text and keep a history of every translation", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History file (overrides the configured location)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate text once and record it in the history
    Translate {
        /// Source language code (defaults to [languages].from)
        #[arg(long)]
        from: Option<String>,
        /// Target language code (defaults to [languages].to)
        #[arg(long)]
        to: Option<String>,
        /// Text to translate
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show past translations, newest first
    History {
        /// Maximum number of entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// List supported languages
    Languages,
    /// Start the interactive translator
    Repl,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Languages = cli.command {
        commands::languages::run();
        return Ok(());
    }

    let settings = Settings::load(cli.config, cli.history)?;
    let _log_guard = logging::init(&settings.config.logging, &settings.paths.logs_dir())?;
    tracing::info!("[babel] Starting {}", env!("CARGO_PKG_VERSION"));

    let app = App::open(settings).await?;

    match cli.command {
        Commands::Translate { from, to, text } => {
            commands::translate::run(&app, from, to, text.join(" ")).await?
        }
        Commands::History { limit } => commands::history::run(&app, limit).await?,
        Commands::Repl => commands::repl::run(&app).await?,
        Commands::Languages => {}
    }

    Ok(())
}
