//! Human-readable account of a deployment.

use std::fmt;

use crate::catalog::PublishedCatalog;
use crate::package::SpecVersion;
use crate::resolver::Resolution;

/// One line of a deployment report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
    /// An existing file is superseded by an incoming one.
    Replacing {
        superseded: String,
        superseded_version: SpecVersion,
        incoming: String,
        incoming_version: SpecVersion,
    },

    /// An incoming file is copied into the repository.
    Deploying { file: String, codename: String },
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportEntry::Replacing {
                superseded,
                superseded_version,
                incoming,
                incoming_version,
            } => write!(
                f,
                "Replacing {} (was version {}, superseded by {} with version {})",
                superseded, superseded_version, incoming, incoming_version
            ),
            ReportEntry::Deploying { file, codename } => {
                write!(f, "Deploying {} (codename : {})", file, codename)
            }
        }
    }
}

/// Report lines for a resolution: replacements first, then every deployed
/// file in file-name order.
pub fn entries_for(resolution: &Resolution) -> Vec<ReportEntry> {
    let mut entries = Vec::new();

    for replacement in &resolution.replacements {
        for old in &replacement.superseded {
            entries.push(ReportEntry::Replacing {
                superseded: old.file_name(),
                superseded_version: old.version.clone(),
                incoming: replacement.incoming.file_name(),
                incoming_version: replacement.incoming.version.clone(),
            });
        }
    }

    let mut deployed: Vec<_> = resolution.accepted().collect();
    deployed.sort_by_key(|package| package.file_name());
    entries.extend(deployed.into_iter().map(|package| ReportEntry::Deploying {
        file: package.file_name(),
        codename: package.codename.clone(),
    }));

    entries
}

/// Outcome of a deployment run.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub release: String,
    pub repository: String,
    pub entries: Vec<ReportEntry>,

    /// Nothing was changed on disk.
    pub dry_run: bool,

    /// Snapshot now served by the release link.
    pub snapshot: Option<String>,

    pub catalog: Option<PublishedCatalog>,
}

impl DeployReport {
    pub fn new(release: impl Into<String>, repository: impl Into<String>, entries: Vec<ReportEntry>) -> Self {
        Self {
            release: release.into(),
            repository: repository.into(),
            entries,
            dry_run: false,
            snapshot: None,
            catalog: None,
        }
    }

    /// Number of files deployed.
    pub fn deployed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, ReportEntry::Deploying { .. }))
            .count()
    }

    /// Number of files replaced.
    pub fn replaced(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, ReportEntry::Replacing { .. }))
            .count()
    }

    /// Report text, one entry per line.
    pub fn body(&self) -> String {
        let mut body = format!("Update center {} / {}\n", self.release, self.repository);
        if self.entries.is_empty() {
            body.push_str("\nNo packages deployed; catalog regenerated.\n");
        } else {
            body.push('\n');
            for entry in &self.entries {
                body.push_str(&entry.to_string());
                body.push('\n');
            }
        }
        if let Some(catalog) = &self.catalog {
            body.push_str(&format!(
                "\nCatalog lists {} modules and {} licenses.\n",
                catalog.module_count, catalog.license_count
            ));
            for warning in &catalog.warnings {
                body.push_str(&format!("Warning: {}\n", warning));
            }
        }
        body
    }
}
