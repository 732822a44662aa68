//! Deploy command - publish nbm files into a repository.

use std::path::PathBuf;

use clap::Args;
use nbmdeploy::catalog::Notification;
use nbmdeploy::config::DeployConfig;
use nbmdeploy::deploy::{DeployRequest, Deployer};
use nbmdeploy::report::LogSink;

use super::output::{print_deploy_report, Output};
use crate::error::CliError;

/// Arguments of the deploy command.
#[derive(Debug, Args)]
pub struct DeployArgs {
    /// The directory containing the new nbm files to deploy
    pub nbmdir: Option<PathBuf>,

    /// The repository to deploy to
    #[arg(long)]
    pub repo: String,

    /// The release to deploy to (MAJOR.MINOR)
    #[arg(long)]
    pub release: String,

    /// The notification message
    #[arg(long)]
    pub notif: Option<String>,

    /// The notification url (only used if --notif is provided)
    #[arg(long)]
    pub notifurl: Option<String>,

    /// Check and resolve without modifying the update center
    #[arg(long)]
    pub dry_run: bool,

    /// Do not mail the deployment report
    #[arg(long)]
    pub no_report: bool,
}

impl DeployArgs {
    /// The deployment request described by the arguments.
    pub fn to_request(&self) -> DeployRequest {
        let mut request = DeployRequest::new(&self.release, &self.repo).with_dry_run(self.dry_run);
        if let Some(dir) = &self.nbmdir {
            request = request.with_incoming(dir);
        }

        match (&self.notif, &self.notifurl) {
            (Some(message), url) => {
                let mut notification = Notification::new(message);
                if let Some(url) = url {
                    notification = notification.with_url(url);
                }
                request = request.with_notification(notification);
            }
            (None, Some(_)) => tracing::warn!("--notifurl is ignored without --notif"),
            (None, None) => {}
        }

        request
    }
}

/// Run the deploy command.
pub fn run(args: &DeployArgs, config: &DeployConfig, out: &dyn Output) -> Result<(), CliError> {
    let mut deployer = Deployer::from_config(config);
    if args.no_report {
        deployer = deployer.with_sink(Box::new(LogSink));
    }

    let report = deployer.run(&args.to_request())?;
    print_deploy_report(out, &report);
    Ok(())
}
