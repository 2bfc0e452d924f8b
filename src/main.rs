//! # pwagh
//!
//! Command-line front end for the PWA builder's GitHub integration.
//!
//! - `pwagh publish <PATH> <REPO>` pushes a directory to GitHub
//! - `pwagh clone <PROJECT>` seeds a project's public directory from the template
//! - `pwagh home` prints the configuration directory
//!
//! Results are printed to stdout as JSON; progress and logs go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pwagh::{DEFAULT_BRANCH, Outcome, cmd_clone, cmd_publish, init_logging, pwagh_home};
use std::path::PathBuf;
use std::process::ExitCode;

/// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(
    name = "pwagh",
    version,
    about = "pwagh - publish PWA projects to GitHub",
    arg_required_else_help = true
)]
struct Cli {
    /// Settings file (defaults to $(pwagh home)/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Push a local directory to a GitHub repository
    Publish {
        path: PathBuf,
        repo: String,
        #[arg(long, default_value = DEFAULT_BRANCH)]
        branch: String,
    },
    /// Clone the template repository into a project's public directory
    Clone {
        project: String,
        /// Source repository (defaults to the configured template)
        #[arg(long)]
        url: Option<String>,
    },
    /// Print the configuration directory
    Home,
}

fn report(outcome: &Outcome) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging()?;
    let config = cli.config.as_deref();

    match cli.cmd {
        Cmd::Publish { path, repo, branch } => report(&cmd_publish(config, path, &repo, &branch)?),
        Cmd::Clone { project, url } => report(&cmd_clone(config, &project, url)?),
        Cmd::Home => {
            println!("{}", pwagh_home()?.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}
