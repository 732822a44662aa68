//! Deployer configuration.
//!
//! Settings are read from an INI file:
//!
//! ```ini
//! [updatecenter]
//! root = /var/www/updatecenter
//! repositories = snap, snap-extensions, snap-community
//!
//! [report]
//! enabled = true
//! sendmail = /usr/sbin/sendmail
//! from = root@localhost
//! to = release@example.org, qa@example.org
//! subject = Update Center modifications
//!
//! [logging]
//! level = info
//! directory = /var/log/nbmdeploy
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use std::io;
use std::path::{Path, PathBuf};

use ini::{Ini, Properties};
use thiserror::Error;

use crate::updatecenter::UpdateCenter;

/// Location of the system configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/nbmdeploy/config.ini";

/// Default update-center root.
pub const DEFAULT_ROOT: &str = "/var/www/updatecenter";

/// Repositories present in every release by default.
pub const DEFAULT_REPOSITORIES: [&str; 3] = ["snap", "snap-extensions", "snap-community"];

pub const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail";
pub const DEFAULT_SENDER: &str = "root@localhost";
pub const DEFAULT_SUBJECT: &str = "Update Center modifications";
pub const DEFAULT_LOG_LEVEL: &str = "info";

const SECTION_UPDATECENTER: &str = "updatecenter";
const SECTION_REPORT: &str = "report";
const SECTION_LOGGING: &str = "logging";

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to write config {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid value for [{section}] {key}: {reason}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        reason: String,
    },
}

/// Report delivery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Send a report after each successful deployment.
    pub enabled: bool,

    /// Path of the sendmail-compatible binary.
    pub sendmail: PathBuf,

    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sendmail: PathBuf::from(DEFAULT_SENDMAIL),
            from: DEFAULT_SENDER.to_string(),
            to: Vec::new(),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,

    /// Directory for a log file, in addition to stderr.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// Complete deployer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Directory holding release links and snapshots.
    pub root: PathBuf,

    /// Repositories created for every new release.
    pub repositories: Vec<String>,

    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            repositories: DEFAULT_REPOSITORIES.iter().map(|r| r.to_string()).collect(),
            report: ReportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DeployConfig {
    /// Create a configuration for the given update-center root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Set the repositories.
    pub fn with_repositories<I, S>(mut self, repositories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repositories = repositories.into_iter().map(Into::into).collect();
        self
    }

    /// Set the report settings.
    pub fn with_report(mut self, report: ReportConfig) -> Self {
        self.report = report;
        self
    }

    /// Set the default log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    /// Also write logs into `directory`.
    pub fn with_log_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.logging.directory = Some(directory.into());
        self
    }

    /// Load configuration from an INI file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Load an explicit file, or the system file when it exists, or defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Build a configuration from parsed INI content.
    pub fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some(SECTION_UPDATECENTER)) {
            if let Some(root) = non_empty(section, "root") {
                config.root = PathBuf::from(root);
            }
            if let Some(repositories) = section.get("repositories") {
                config.repositories = split_list(repositories);
            }
        }

        if let Some(section) = ini.section(Some(SECTION_REPORT)) {
            if let Some(enabled) = section.get("enabled") {
                config.report.enabled = parse_bool(SECTION_REPORT, "enabled", enabled)?;
            }
            if let Some(sendmail) = non_empty(section, "sendmail") {
                config.report.sendmail = PathBuf::from(sendmail);
            }
            if let Some(from) = non_empty(section, "from") {
                config.report.from = from.to_string();
            }
            if let Some(to) = section.get("to") {
                config.report.to = split_list(to);
            }
            if let Some(subject) = non_empty(section, "subject") {
                config.report.subject = subject.to_string();
            }
        }

        if let Some(section) = ini.section(Some(SECTION_LOGGING)) {
            if let Some(level) = non_empty(section, "level") {
                config.logging.level = level.to_string();
            }
            config.logging.directory = non_empty(section, "directory").map(PathBuf::from);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.repositories.is_empty() {
            return Err(ConfigError::InvalidValue {
                section: SECTION_UPDATECENTER,
                key: "repositories",
                reason: "at least one repository is required".to_string(),
            });
        }
        if self.report.enabled && self.report.to.is_empty() {
            return Err(ConfigError::InvalidValue {
                section: SECTION_REPORT,
                key: "to",
                reason: "reporting is enabled but no recipient is configured".to_string(),
            });
        }
        Ok(())
    }

    /// Render the configuration as INI.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some(SECTION_UPDATECENTER))
            .set("root", self.root.display().to_string())
            .set("repositories", self.repositories.join(", "));
        ini.with_section(Some(SECTION_REPORT))
            .set("enabled", self.report.enabled.to_string())
            .set("sendmail", self.report.sendmail.display().to_string())
            .set("from", self.report.from.as_str())
            .set("to", self.report.to.join(", "))
            .set("subject", self.report.subject.as_str());
        ini.with_section(Some(SECTION_LOGGING))
            .set("level", self.logging.level.as_str())
            .set(
                "directory",
                self.logging
                    .directory
                    .as_ref()
                    .map(|d| d.display().to_string())
                    .unwrap_or_default(),
            );
        ini
    }

    /// Write the configuration to an INI file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        self.to_ini()
            .write_to_file(path)
            .map_err(|source| ConfigError::WriteFailed {
                path: path.to_path_buf(),
                source,
            })
    }

    /// The update center described by this configuration.
    pub fn update_center(&self) -> UpdateCenter {
        UpdateCenter::new(&self.root, self.repositories.clone())
    }
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(section: &'static str, key: &'static str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            section,
            key,
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}
