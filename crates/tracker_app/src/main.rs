mod app;
mod config;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use tracker_logging::LogDestination;

#[derive(Parser, Debug)]
#[command(author, version, about = "Submit reports for analysis and follow them to completion")]
struct Args {
    #[arg(
        short = 'c',
        long = "config",
        help = "RON config file (defaults to ./tracker.ron when present)"
    )]
    config: Option<PathBuf>,

    #[arg(long = "base-url", help = "Analysis backend base URL")]
    base_url: Option<String>,

    #[arg(short = 'v', long = "verbose", help = "Also log to the terminal")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a PDF file or a document URL and wait for the result.
    Submit {
        /// Path to a PDF, or an http(s) URL.
        source: String,
    },
    /// List recent analyses.
    Recent,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (destination, level) = if args.verbose {
        (LogDestination::Both, LevelFilter::Debug)
    } else {
        (LogDestination::File, LevelFilter::Info)
    };
    tracker_logging::initialize(destination, level);

    let mut config = config::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    let mut app = app::App::new(&config)?;
    match args.command {
        Command::Submit { source } => {
            app.submit(&source).await?;
        }
        Command::Recent => app.recent().await,
    }
    Ok(())
}
