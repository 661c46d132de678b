//! Flipbook CLI - turn an ordered batch of still images into a looping GIF.
//!
//! # Usage
//!
//! ```bash
//! # Animate three frames at the defaults (100% scale, 2 fps, infinite loop)
//! flipbook animate a.png b.png c.png
//!
//! # Half size, 10 fps, aspect-preserving fit, every image in a directory
//! flipbook animate ./frames/ --size 50 --fps 10 --policy thumbnail
//!
//! # View configuration
//! flipbook config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Flipbook - turn an ordered batch of still images into a looping GIF.
#[derive(Parser, Debug)]
#[command(name = "flipbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an animated GIF from images, in the order given
    Animate(cli::animate::AnimateArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match flipbook_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `flipbook config path`."
            );
            flipbook_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Flipbook v{}", flipbook_core::VERSION);

    match cli.command {
        Commands::Animate(args) => cli::animate::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
