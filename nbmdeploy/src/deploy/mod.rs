//! Deployment runs.
//!
//! [`Deployer::run`] performs one all-or-nothing deployment into one
//! repository of one release:
//!
//! 1. check the release name, repository and input directory
//! 2. inspect incoming and existing packages and resolve supersession
//! 3. copy the current snapshot, or create an empty one for a new release
//! 4. apply the resolution to that snapshot
//! 5. regenerate and validate the snapshot's catalog
//! 6. point the release link at the snapshot
//!
//! Nothing is written before step 2 has succeeded, and the release link is
//! only created or moved once the new catalog is in place. A run that fails
//! after the snapshot was made removes it again.

mod error;
mod report;

pub use error::{DeployError, DeployResult};
pub use report::{entries_for, DeployReport, ReportEntry};

use std::path::PathBuf;

use tracing::{info, warn};

use crate::catalog::{generate_catalog, CatalogTimestamp, Notification, PublishedCatalog};
use crate::config::DeployConfig;
use crate::package::{inspect_directory, Package};
use crate::report::{deliver, LogSink, ReportSink};
use crate::resolver::{resolve, Resolution};
use crate::updatecenter::{apply_resolution, validate_release, Snapshot, UpdateCenter};

/// Parameters of one deployment.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub release: String,
    pub repository: String,

    /// Directory of packages to deploy. `None` only regenerates the catalog.
    pub incoming_dir: Option<PathBuf>,

    pub notification: Option<Notification>,
    pub dry_run: bool,
}

impl DeployRequest {
    pub fn new(release: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            release: release.into(),
            repository: repository.into(),
            incoming_dir: None,
            notification: None,
            dry_run: false,
        }
    }

    pub fn with_incoming(mut self, dir: impl Into<PathBuf>) -> Self {
        self.incoming_dir = Some(dir.into());
        self
    }

    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }

    /// Stop after resolution without touching the update center.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Checked input of a run: what to deploy and how it resolves.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub incoming: Vec<Package>,
    pub existing: Vec<Package>,
    pub resolution: Resolution,
}

/// Runs deployments against one update center.
pub struct Deployer {
    update_center: UpdateCenter,
    sink: Box<dyn ReportSink>,
}

impl Deployer {
    /// Create a deployer that logs its reports.
    pub fn new(update_center: UpdateCenter) -> Self {
        Self {
            update_center,
            sink: Box::new(LogSink),
        }
    }

    /// Create a deployer from configuration, with its configured report sink.
    pub fn from_config(config: &DeployConfig) -> Self {
        Self {
            update_center: config.update_center(),
            sink: crate::report::sink_from_config(&config.report),
        }
    }

    /// Replace the report sink.
    pub fn with_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn update_center(&self) -> &UpdateCenter {
        &self.update_center
    }

    /// Validate a request and resolve it without modifying anything.
    pub fn plan(&self, request: &DeployRequest) -> DeployResult<DeployPlan> {
        validate_release(&request.release)?;
        self.update_center.check_repository(&request.repository)?;

        info!("Checking input...");
        let incoming = match &request.incoming_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(DeployError::InputNotDirectory(dir.clone()));
                }
                let packages = inspect_directory(dir)?;
                if packages.is_empty() {
                    return Err(DeployError::NoPackages(dir.clone()));
                }
                packages
            }
            None => {
                info!("No package directory given, only regenerating the catalog");
                Vec::new()
            }
        };

        let existing = match self
            .update_center
            .current_repository(&request.release, &request.repository)
        {
            Some(dir) => inspect_directory(&dir)?,
            None => Vec::new(),
        };

        let resolution = resolve(&incoming, &existing)?;
        Ok(DeployPlan {
            incoming,
            existing,
            resolution,
        })
    }

    /// Run a deployment.
    pub fn run(&self, request: &DeployRequest) -> DeployResult<DeployReport> {
        let plan = self.plan(request)?;

        let entries = entries_for(&plan.resolution);
        for entry in &entries {
            match entry {
                ReportEntry::Replacing { .. } => warn!("{}", entry),
                ReportEntry::Deploying { .. } => info!("{}", entry),
            }
        }
        let mut report = DeployReport::new(&request.release, &request.repository, entries);

        if request.dry_run {
            info!(
                release = %request.release,
                repository = %request.repository,
                "Dry run, update center left unchanged"
            );
            report.dry_run = true;
            return Ok(report);
        }

        let snapshot = self.update_center.working_snapshot(&request.release)?;

        match self.publish(request, &plan.resolution, &snapshot) {
            Ok(catalog) => {
                report.catalog = Some(catalog);
                report.snapshot = Some(snapshot.name().to_string());
            }
            Err(e) => {
                if let Err(cleanup) = self.update_center.discard(&snapshot) {
                    warn!(snapshot = snapshot.name(), error = %cleanup, "Failed to remove abandoned snapshot");
                }
                return Err(e);
            }
        }

        deliver(self.sink.as_ref(), &report);
        Ok(report)
    }

    fn publish(
        &self,
        request: &DeployRequest,
        resolution: &Resolution,
        snapshot: &Snapshot,
    ) -> DeployResult<PublishedCatalog> {
        let repo_dir = snapshot.repository(&request.repository);
        apply_resolution(resolution, &repo_dir)?;

        let catalog = generate_catalog(
            &repo_dir,
            request.notification.as_ref(),
            &CatalogTimestamp::now(),
        )?;

        self.update_center.repoint(&request.release, snapshot)?;
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, CATALOG_FILENAME};
    use crate::report::ReportResult;
    use crate::resolver::ResolveError;
    use crate::testing::{write_module, write_nbm};
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl ReportSink for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn send(&self, report: &DeployReport) -> ReportResult<()> {
            self.0.lock().unwrap().push(report.body());
            Ok(())
        }
    }

    fn setup() -> (TempDir, PathBuf, Deployer, Recorder) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("uc");
        let incoming = temp.path().join("incoming");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&incoming).unwrap();
        let recorder = Recorder::default();
        let deployer = Deployer::new(UpdateCenter::new(&root, vec!["snap".into(), "snap-extensions".into()]))
            .with_sink(Box::new(recorder.clone()));
        (temp, incoming, deployer, recorder)
    }

    #[test]
    fn test_first_deployment_creates_release() {
        let (_temp, incoming, deployer, recorder) = setup();
        write_module(&incoming, "a.nbm", "org.a", "1.0");

        let request = DeployRequest::new("3.0", "snap").with_incoming(&incoming);
        let report = deployer.run(&request).unwrap();

        assert_eq!(report.deployed(), 1);
        let repo = deployer.update_center().current_repository("3.0", "snap").unwrap();
        assert!(repo.join("a.nbm").is_file());
        assert!(repo.join(CATALOG_FILENAME).is_file());
        assert!(deployer
            .update_center()
            .current_repository("3.0", "snap-extensions")
            .is_some());
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_conflict_leaves_release_untouched() {
        let (temp, incoming, deployer, recorder) = setup();
        write_module(&incoming, "a.nbm", "org.a", "2.0");
        let request = DeployRequest::new("3.0", "snap").with_incoming(&incoming);
        deployer.run(&request).unwrap();
        let before = fs::read_link(deployer.update_center().release_link("3.0")).unwrap();
        let snapshots = fs::read_dir(temp.path().join("uc")).unwrap().count();

        let again = temp.path().join("again");
        fs::create_dir_all(&again).unwrap();
        write_module(&again, "a-2.nbm", "org.a", "2.0");
        let err = deployer
            .run(&DeployRequest::new("3.0", "snap").with_incoming(&again))
            .unwrap_err();

        assert!(matches!(err, DeployError::Resolve(ResolveError::VersionConflict { .. })));
        assert_eq!(fs::read_link(deployer.update_center().release_link("3.0")).unwrap(), before);
        assert_eq!(fs::read_dir(temp.path().join("uc")).unwrap().count(), snapshots);
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_catalog_on_new_release_leaves_no_trace() {
        let (temp, incoming, deployer, recorder) = setup();
        write_nbm(
            &incoming,
            "a.nbm",
            r#"<module codenamebase="org.a" distribution="a.nbm"><manifest OpenIDE-Module-Specification-Version="1.0"/></module>"#,
        );

        let err = deployer
            .run(&DeployRequest::new("9.0", "snap").with_incoming(&incoming))
            .unwrap_err();
        assert!(matches!(
            err,
            DeployError::Catalog(CatalogError::CatalogValidationFailed(_))
        ));

        let uc = deployer.update_center();
        assert!(uc.release_link("9.0").symlink_metadata().is_err());
        assert!(uc.current_repository("9.0", "snap").is_none());
        assert_eq!(fs::read_dir(temp.path().join("uc")).unwrap().count(), 0);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_catalog_keeps_existing_release() {
        let (temp, incoming, deployer, recorder) = setup();
        write_module(&incoming, "a.nbm", "org.a", "1.0");
        deployer
            .run(&DeployRequest::new("3.0", "snap").with_incoming(&incoming))
            .unwrap();
        let link = deployer.update_center().release_link("3.0");
        let before = fs::read_link(&link).unwrap();

        let broken = temp.path().join("broken");
        fs::create_dir_all(&broken).unwrap();
        write_nbm(
            &broken,
            "b.nbm",
            r#"<module codenamebase="org.b" distribution="b.nbm"><manifest OpenIDE-Module-Specification-Version="1.0"/></module>"#,
        );
        let err = deployer
            .run(&DeployRequest::new("3.0", "snap").with_incoming(&broken))
            .unwrap_err();
        assert!(matches!(err, DeployError::Catalog(_)));

        assert_eq!(fs::read_link(&link).unwrap(), before);
        let current = deployer.update_center().current_repository("3.0", "snap").unwrap();
        assert!(current.join("a.nbm").is_file());
        assert!(!current.join("b.nbm").exists());
        assert!(current.join(CATALOG_FILENAME).is_file());
        // The release link and its single snapshot.
        assert_eq!(fs::read_dir(temp.path().join("uc")).unwrap().count(), 2);
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let (temp, incoming, deployer, recorder) = setup();
        write_module(&incoming, "a.nbm", "org.a", "1.0");

        let report = deployer
            .run(
                &DeployRequest::new("3.0", "snap")
                    .with_incoming(&incoming)
                    .with_dry_run(true),
            )
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(fs::read_dir(temp.path().join("uc")).unwrap().count(), 0);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_input_checks() {
        let (temp, incoming, deployer, _recorder) = setup();

        let err = deployer
            .run(&DeployRequest::new("3.0", "snap").with_incoming(&incoming))
            .unwrap_err();
        assert!(matches!(err, DeployError::NoPackages(_)));

        let err = deployer
            .run(&DeployRequest::new("3.0", "snap").with_incoming(temp.path().join("nope")))
            .unwrap_err();
        assert!(matches!(err, DeployError::InputNotDirectory(_)));

        let err = deployer.run(&DeployRequest::new("3", "snap")).unwrap_err();
        assert!(matches!(err, DeployError::UpdateCenter(_)));

        let err = deployer.run(&DeployRequest::new("3.0", "other")).unwrap_err();
        assert!(matches!(err, DeployError::UpdateCenter(_)));
    }
}
