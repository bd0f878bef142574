//! Captioner CLI - paste an image URL, see the image, get a caption.
//!
//! Captioner fetches an image from a URL, shows it, and asks a vision model
//! for a one-sentence caption. Any failure along the way is shown as a
//! message; the session keeps going.
//!
//! # Usage
//!
//! ```bash
//! # Caption a single image
//! captioner caption https://example.com/cat.jpg
//!
//! # Keep prompting for URLs (also the default on a terminal)
//! captioner interactive
//!
//! # Write the static web page
//! captioner page --output index.html
//!
//! # View configuration
//! captioner config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Captioner - paste an image URL, see the image, get a caption.
#[derive(Parser, Debug)]
#[command(name = "captioner")]
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
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch one image URL and caption it
    Caption(cli::caption::CaptionArgs),

    /// Prompt for image URLs until interrupted
    Interactive(cli::ModelArgs),

    /// Write the static captioning web page
    Page(cli::page::PageArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go straight to stderr.
    let config = match captioner_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `captioner config path`."
            );
            captioner_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Captioner v{}", captioner_core::VERSION);

    match cli.command {
        Some(Commands::Caption(args)) => cli::caption::execute(args, config).await,
        Some(Commands::Interactive(overrides)) => cli::interactive::run(overrides, config).await,
        Some(Commands::Page(args)) => cli::page::execute(args),
        Some(Commands::Config(args)) => cli::config::execute(args, &config),
        None if console::user_attended() => {
            cli::interactive::run(cli::ModelArgs::default(), config).await
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
