use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use git_resource::check::{default_cache_dir, run_check};
use git_resource::config::CheckRequest;
use git_resource::{logging, output};

#[derive(Parser)]
#[command(
    name = "git-resource",
    version,
    about = "Discover new versions of a git repository for a CI pipeline"
)]
struct Args {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a check request from stdin and print new versions to stdout
    Check {
        #[arg(long, help = "Directory holding the repository mirror")]
        cache_dir: Option<PathBuf>,
    },
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(e) = run(args.command) {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Check { cache_dir } => {
            let request =
                CheckRequest::from_reader(io::stdin().lock()).context("Cannot read request")?;
            let cache_dir = cache_dir.unwrap_or_else(default_cache_dir);

            let versions = run_check(&request, &cache_dir)?;
            output::write_versions(io::stdout().lock(), &versions)?;
        }
    }

    Ok(())
}
