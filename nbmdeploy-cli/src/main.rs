//! nbmdeploy CLI - deploy NetBeans module packages to an update center.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use nbmdeploy::config::DeployConfig;
use nbmdeploy::logging;

use commands::config::ConfigCommands;
use commands::deploy::DeployArgs;
use commands::output::ConsoleOutput;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "nbmdeploy", version, about = "Deploy nbms to the Update Center")]
struct Cli {
    /// Configuration file (default: /etc/nbmdeploy/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Deploy nbm files to a repository and regenerate its catalog
    Deploy(DeployArgs),

    /// Show the metadata of nbm files
    Inspect {
        /// Packages to inspect
        #[arg(required = true)]
        nbms: Vec<PathBuf>,
    },

    /// Validate an updates.xml against the catalog DTD
    Validate {
        /// Catalog file to check
        catalog: PathBuf,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let out = ConsoleOutput;

    if let Commands::Config(command) = &cli.command {
        return commands::config::run(command, cli.config.as_deref(), &out);
    }

    let mut config = DeployConfig::load_or_default(cli.config.as_deref())?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    let _guard = logging::init(&config.logging)?;

    match &cli.command {
        Commands::Deploy(args) => commands::deploy::run(args, &config, &out),
        Commands::Inspect { nbms } => commands::inspect::run(nbms, &out),
        Commands::Validate { catalog } => commands::validate::run(catalog, &out),
        Commands::Config(_) => Ok(()),
    }
}
