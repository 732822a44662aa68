//! Update-center tree.
//!
//! Every release is published through a symlink: `<root>/<release>` points at
//! a time-stamped snapshot directory `<release>_<YYYYmmdd-HHMMSS>` holding one
//! directory per repository. A deployment copies the current snapshot, edits
//! the copy and swaps the link once the copy's catalog has been published, so
//! readers only ever see a complete snapshot.

mod error;

pub use error::{UpdateCenterError, UpdateCenterResult};

use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::resolver::Resolution;

/// Format of the time stamp appended to snapshot directory names.
pub const SNAPSHOT_TIME_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Check that a release name has the form `MAJOR.MINOR`.
pub fn validate_release(release: &str) -> UpdateCenterResult<()> {
    let is_number = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match release.split_once('.') {
        Some((major, minor)) if is_number(major) && is_number(minor) => Ok(()),
        _ => Err(UpdateCenterError::InvalidRelease(release.to_string())),
    }
}

/// Directory name of a snapshot taken at `time`.
pub fn snapshot_name<Tz: TimeZone>(release: &str, time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}", release, time.format(SNAPSHOT_TIME_FORMAT))
}

/// A snapshot directory of a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    name: String,
    path: PathBuf,
}

impl Snapshot {
    /// Directory name, used as the relative symlink target.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory of one repository inside the snapshot.
    pub fn repository(&self, repo: &str) -> PathBuf {
        self.path.join(repo)
    }
}

/// The update-center root and its configured repositories.
#[derive(Debug, Clone)]
pub struct UpdateCenter {
    root: PathBuf,
    repositories: Vec<String>,
}

impl UpdateCenter {
    pub fn new(root: impl Into<PathBuf>, repositories: Vec<String>) -> Self {
        Self {
            root: root.into(),
            repositories,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    /// Check that `repo` is a configured repository.
    pub fn check_repository(&self, repo: &str) -> UpdateCenterResult<()> {
        if self.repositories.iter().any(|known| known == repo) {
            Ok(())
        } else {
            Err(UpdateCenterError::UnknownRepository {
                repo: repo.to_string(),
                known: self.repositories.join(", "),
            })
        }
    }

    /// Path of the release symlink.
    pub fn release_link(&self, release: &str) -> PathBuf {
        self.root.join(release)
    }

    /// Whether the release link resolves to a directory.
    pub fn has_release(&self, release: &str) -> bool {
        self.release_link(release).is_dir()
    }

    /// The snapshot directory the release link currently resolves to.
    pub fn current_dir(&self, release: &str) -> UpdateCenterResult<PathBuf> {
        let link = self.release_link(release);
        match fs::canonicalize(&link) {
            Ok(path) if path.is_dir() => Ok(path),
            _ => Err(UpdateCenterError::NoCurrentSnapshot {
                release: release.to_string(),
                path: link,
            }),
        }
    }

    /// Current directory of one repository, if the release and repository exist.
    pub fn current_repository(&self, release: &str, repo: &str) -> Option<PathBuf> {
        let dir = self.current_dir(release).ok()?.join(repo);
        dir.is_dir().then_some(dir)
    }

    /// Create the first snapshot of a release with every repository directory.
    ///
    /// The snapshot is not linked; [`UpdateCenter::repoint`] publishes it.
    /// Returns `None` when the release already exists.
    pub fn init_release(&self, release: &str) -> UpdateCenterResult<Option<Snapshot>> {
        if self.has_release(release) {
            return Ok(None);
        }

        let snapshot = self.allocate_snapshot(release)?;
        create_dir(snapshot.path())?;
        for repo in &self.repositories {
            create_dir(&snapshot.repository(repo))?;
        }

        info!(release, snapshot = snapshot.name(), "Initialized new release");
        Ok(Some(snapshot))
    }

    /// Unlinked snapshot to publish into: a fresh one for a new release,
    /// otherwise a copy of the current one.
    pub fn working_snapshot(&self, release: &str) -> UpdateCenterResult<Snapshot> {
        match self.init_release(release)? {
            Some(snapshot) => Ok(snapshot),
            None => self.duplicate_current(release),
        }
    }

    /// Copy the current snapshot of a release into a new snapshot.
    pub fn duplicate_current(&self, release: &str) -> UpdateCenterResult<Snapshot> {
        let current = self.current_dir(release)?;
        let snapshot = self.allocate_snapshot(release)?;

        info!(from = %current.display(), to = %snapshot.path().display(), "Creating snapshot");
        copy_tree(&current, snapshot.path())?;
        Ok(snapshot)
    }

    /// Atomically point the release link at `snapshot`.
    ///
    /// A temporary link is created next to the release link and renamed over
    /// it. The link target is the snapshot's directory name.
    pub fn repoint(&self, release: &str, snapshot: &Snapshot) -> UpdateCenterResult<()> {
        let link = self.release_link(release);
        let temp = self
            .root
            .join(format!(".{}.link-{}", release, std::process::id()));
        let target = PathBuf::from(snapshot.name());

        if temp.symlink_metadata().is_ok() {
            fs::remove_file(&temp).map_err(|source| UpdateCenterError::RemoveFailed {
                path: temp.clone(),
                source,
            })?;
        }

        symlink(&target, &temp).map_err(|e| UpdateCenterError::SymlinkFailed {
            link: temp.clone(),
            target: target.clone(),
            reason: e.to_string(),
        })?;

        if let Err(e) = fs::rename(&temp, &link) {
            if let Err(cleanup) = fs::remove_file(&temp) {
                warn!(path = %temp.display(), error = %cleanup, "Failed to remove temporary link");
            }
            return Err(UpdateCenterError::SymlinkFailed {
                link,
                target,
                reason: e.to_string(),
            });
        }

        info!(release, snapshot = snapshot.name(), "Release now points to new snapshot");
        Ok(())
    }

    /// Delete a snapshot that was never linked.
    pub fn discard(&self, snapshot: &Snapshot) -> UpdateCenterResult<()> {
        info!(snapshot = snapshot.name(), "Removing abandoned snapshot");
        fs::remove_dir_all(snapshot.path()).map_err(|source| UpdateCenterError::RemoveFailed {
            path: snapshot.path().to_path_buf(),
            source,
        })
    }

    /// Pick an unused snapshot name for the current time.
    fn allocate_snapshot(&self, release: &str) -> UpdateCenterResult<Snapshot> {
        let base = snapshot_name(release, &Local::now());
        let mut name = base.clone();
        let mut suffix = 1;
        while self.root.join(&name).symlink_metadata().is_ok() {
            name = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        Ok(Snapshot {
            path: self.root.join(&name),
            name,
        })
    }
}

fn create_dir(path: &Path) -> UpdateCenterResult<()> {
    fs::create_dir_all(path).map_err(|source| UpdateCenterError::CreateDirFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively copy `from` into the new directory `to`, keeping symlinks.
pub fn copy_tree(from: &Path, to: &Path) -> UpdateCenterResult<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|source| UpdateCenterError::WalkFailed {
            path: from.to_path_buf(),
            source,
        })?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            create_dir(&target)?;
        } else if file_type.is_symlink() {
            let link_target =
                fs::read_link(entry.path()).map_err(|source| UpdateCenterError::ReadFailed {
                    path: entry.path().to_path_buf(),
                    source,
                })?;
            symlink(&link_target, &target).map_err(|e| UpdateCenterError::SymlinkFailed {
                link: target.clone(),
                target: link_target.clone(),
                reason: e.to_string(),
            })?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> UpdateCenterResult<()> {
    fs::copy(from, to).map_err(|source| UpdateCenterError::CopyFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Apply a resolution to a repository directory.
///
/// Superseded files are removed by file name, then every accepted package is
/// copied in.
pub fn apply_resolution(resolution: &Resolution, repo_dir: &Path) -> UpdateCenterResult<()> {
    create_dir(repo_dir)?;

    for package in resolution.superseded() {
        let path = repo_dir.join(package.file_name());
        debug!(path = %path.display(), "Removing superseded package");
        fs::remove_file(&path).map_err(|source| UpdateCenterError::RemoveFailed { path, source })?;
    }

    for package in resolution.accepted() {
        let target = repo_dir.join(package.file_name());
        debug!(from = %package.path.display(), to = %target.display(), "Copying package");
        copy_file(&package.path, &target)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;
    use crate::resolver::Replacement;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn repos() -> Vec<String> {
        vec!["snap".to_string(), "snap-extensions".to_string()]
    }

    #[test]
    fn test_validate_release() {
        assert!(validate_release("3.0").is_ok());
        assert!(validate_release("10.12").is_ok());
        for bad in ["3", "3.0.1", "v3.0", "3.x", ".0", "3.", "3.0 "] {
            assert!(
                matches!(validate_release(bad), Err(UpdateCenterError::InvalidRelease(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_snapshot_name() {
        let time = NaiveDate::from_ymd_opt(2016, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap()
            .and_utc();
        assert_eq!(snapshot_name("3.0", &time), "3.0_20160102-030405");
    }

    #[test]
    fn test_check_repository() {
        let uc = UpdateCenter::new("/uc", repos());
        assert!(uc.check_repository("snap").is_ok());
        let err = uc.check_repository("other").unwrap_err();
        assert!(err.to_string().contains("snap, snap-extensions"));
    }

    #[test]
    fn test_init_release_leaves_release_unlinked() {
        let temp = TempDir::new().unwrap();
        let uc = UpdateCenter::new(temp.path(), repos());

        let snapshot = uc.init_release("3.0").unwrap().unwrap();
        assert!(snapshot.name().starts_with("3.0_"));
        assert!(snapshot.repository("snap").is_dir());
        assert!(snapshot.repository("snap-extensions").is_dir());
        assert!(uc.release_link("3.0").symlink_metadata().is_err());
        assert!(!uc.has_release("3.0"));

        uc.repoint("3.0", &snapshot).unwrap();
        let link = uc.release_link("3.0");
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from(snapshot.name()));
        assert_eq!(
            uc.current_dir("3.0").unwrap(),
            fs::canonicalize(snapshot.path()).unwrap()
        );

        assert!(uc.init_release("3.0").unwrap().is_none());
    }

    #[test]
    fn test_working_snapshot() {
        let temp = TempDir::new().unwrap();
        let uc = UpdateCenter::new(temp.path(), repos());

        let fresh = uc.working_snapshot("3.0").unwrap();
        assert!(fresh.repository("snap").is_dir());
        assert!(!uc.has_release("3.0"));

        // Abandoning the fresh snapshot leaves nothing behind.
        uc.discard(&fresh).unwrap();
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);

        let first = uc.working_snapshot("3.0").unwrap();
        fs::write(first.repository("snap").join("a.nbm"), b"a").unwrap();
        uc.repoint("3.0", &first).unwrap();

        let copy = uc.working_snapshot("3.0").unwrap();
        assert_ne!(copy.name(), first.name());
        assert_eq!(fs::read(copy.repository("snap").join("a.nbm")).unwrap(), b"a");
        assert_eq!(fs::read_link(uc.release_link("3.0")).unwrap(), PathBuf::from(first.name()));
    }

    #[test]
    fn test_current_dir_missing_release() {
        let temp = TempDir::new().unwrap();
        let uc = UpdateCenter::new(temp.path(), repos());
        assert!(matches!(
            uc.current_dir("4.0"),
            Err(UpdateCenterError::NoCurrentSnapshot { .. })
        ));
        assert!(uc.current_repository("4.0", "snap").is_none());
    }

    #[test]
    fn test_duplicate_copies_tree_under_new_name() {
        let temp = TempDir::new().unwrap();
        let uc = UpdateCenter::new(temp.path(), repos());
        let first = uc.init_release("3.0").unwrap().unwrap();
        uc.repoint("3.0", &first).unwrap();
        fs::write(first.repository("snap").join("a.nbm"), b"a").unwrap();
        symlink("a.nbm", first.repository("snap").join("latest.nbm")).unwrap();

        let second = uc.duplicate_current("3.0").unwrap();
        assert_ne!(first.name(), second.name());
        assert_eq!(fs::read(second.repository("snap").join("a.nbm")).unwrap(), b"a");
        assert_eq!(
            fs::read_link(second.repository("snap").join("latest.nbm")).unwrap(),
            PathBuf::from("a.nbm")
        );
        assert!(second.repository("snap-extensions").is_dir());

        // The link still points at the first snapshot until repointed.
        assert_eq!(fs::read_link(uc.release_link("3.0")).unwrap(), PathBuf::from(first.name()));
        uc.repoint("3.0", &second).unwrap();
        assert_eq!(fs::read_link(uc.release_link("3.0")).unwrap(), PathBuf::from(second.name()));
        assert!(first.path().is_dir());

        uc.discard(&first).unwrap();
        assert!(!first.path().exists());
    }

    #[test]
    fn test_repoint_refuses_real_directory() {
        let temp = TempDir::new().unwrap();
        let uc = UpdateCenter::new(temp.path(), repos());
        fs::create_dir_all(temp.path().join("3.0").join("snap")).unwrap();
        fs::write(temp.path().join("3.0").join("snap").join("x"), b"x").unwrap();

        let snapshot = uc.duplicate_current("3.0").unwrap();
        assert!(uc.repoint("3.0", &snapshot).is_err());
        assert!(temp.path().join("3.0").join("snap").join("x").is_file());

        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_apply_resolution() {
        let temp = TempDir::new().unwrap();
        let incoming_dir = temp.path().join("incoming");
        let repo_dir = temp.path().join("repo");
        fs::create_dir_all(&incoming_dir).unwrap();
        fs::create_dir_all(&repo_dir).unwrap();

        fs::write(incoming_dir.join("a-2.nbm"), b"new a").unwrap();
        fs::write(incoming_dir.join("b.nbm"), b"b").unwrap();
        fs::write(repo_dir.join("a-1.nbm"), b"old a").unwrap();
        fs::write(repo_dir.join("c.nbm"), b"c").unwrap();

        let resolution = Resolution {
            additions: vec![Package::new("org.b", "1.0".parse().unwrap(), incoming_dir.join("b.nbm"))],
            replacements: vec![Replacement {
                incoming: Package::new("org.a", "2.0".parse().unwrap(), incoming_dir.join("a-2.nbm")),
                superseded: vec![Package::new(
                    "org.a",
                    "1.0".parse().unwrap(),
                    temp.path().join("elsewhere").join("a-1.nbm"),
                )],
            }],
        };

        apply_resolution(&resolution, &repo_dir).unwrap();

        let mut names: Vec<String> = fs::read_dir(&repo_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a-2.nbm", "b.nbm", "c.nbm"]);
        assert_eq!(fs::read(repo_dir.join("a-2.nbm")).unwrap(), b"new a");
    }
}
