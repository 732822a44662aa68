//! CLI error type.

use std::fmt;

use nbmdeploy::catalog::CatalogError;
use nbmdeploy::config::ConfigError;
use nbmdeploy::deploy::DeployError;
use nbmdeploy::logging::LoggingError;
use nbmdeploy::package::PackageError;

/// Errors reported by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, saved or used.
    Config(String),

    /// Logging could not be set up.
    Logging(LoggingError),

    /// A deployment failed.
    Deploy(DeployError),

    /// A package could not be inspected.
    Package(PackageError),

    /// A catalog is unreadable or invalid.
    Catalog(CatalogError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Deploy(e) => write!(f, "Deployment failed: {}", e),
            CliError::Package(e) => write!(f, "{}", e),
            CliError::Catalog(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(_) => None,
            CliError::Logging(e) => Some(e),
            CliError::Deploy(e) => Some(e),
            CliError::Package(e) => Some(e),
            CliError::Catalog(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<DeployError> for CliError {
    fn from(e: DeployError) -> Self {
        CliError::Deploy(e)
    }
}

impl From<PackageError> for CliError {
    fn from(e: PackageError) -> Self {
        CliError::Package(e)
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_deploy_error_display() {
        let err: CliError = DeployError::NoPackages(PathBuf::from("/in")).into();
        assert_eq!(
            err.to_string(),
            "Deployment failed: /in does not contain any nbm file"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = CliError::Config("bad".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad");
    }
}
