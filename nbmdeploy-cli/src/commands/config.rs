//! Configuration commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use nbmdeploy::config::{DeployConfig, DEFAULT_CONFIG_PATH};

use super::output::Output;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Print the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Run a config subcommand.
pub fn run(command: &ConfigCommands, explicit: Option<&Path>, out: &dyn Output) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => {
            out.println(&config_path(explicit).display().to_string());
            Ok(())
        }
        ConfigCommands::Show => {
            let config = DeployConfig::load_or_default(explicit)?;
            let mut buffer = Vec::new();
            config
                .to_ini()
                .write_to(&mut buffer)
                .map_err(|e| CliError::Config(e.to_string()))?;
            out.println(String::from_utf8_lossy(&buffer).trim_end());
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = config_path(explicit);
            if path.exists() && !force {
                return Err(CliError::Config(format!(
                    "{} already exists. Use --force to overwrite it.",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CliError::Config(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
            DeployConfig::default().save(&path)?;
            out.success(&format!("Wrote {}", path.display()));
            Ok(())
        }
    }
}
