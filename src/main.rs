use std::path::PathBuf;

use clap::{Parser, Subcommand};

use linkvault::app::{FeedOptions, RunOptions};

/// linkvault - Browse a curated link directory from the terminal.
#[derive(Parser)]
#[command(name = "linkvault")]
#[command(version)]
#[command(about = "Browse a curated link directory from the terminal", long_about = None)]
struct Cli {
    /// Directory of JSON collections (defaults to the bundled set)
    #[arg(long, global = true, env = "LINKVAULT_COLLECTIONS")]
    collections: Option<PathBuf>,

    /// Config file (defaults to ~/.config/linkvault/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write an RSS feed of the most recent links
    Feed {
        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Maximum number of items
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None => linkvault::run(RunOptions {
            config_file: cli.config,
            collections_dir: cli.collections,
            verbose: cli.verbose,
        }),
        Some(Command::Feed { output, limit }) => linkvault::app::write_feed(FeedOptions {
            config_file: cli.config,
            collections_dir: cli.collections,
            output,
            limit,
            verbose: cli.verbose,
        }),
    };

    if let Err(err) = result {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
