//! Supersession resolution for incoming packages.
//!
//! Given the packages a deployment wants to add and the packages already in
//! the target repository, decide for each incoming package whether it is new,
//! replaces existing packages of the same codename, or conflicts with them.
//!
//! An incoming package replaces an existing one only when its specification
//! version is strictly greater. Equal versions are a conflict: redeploying
//! the same version must come with a version bump. A single conflict fails
//! the whole batch.

mod error;

pub use error::{ResolveError, ResolveResult};

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::package::Package;

/// How one incoming package relates to the existing repository content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<'a> {
    /// No existing package has this codename.
    New,

    /// Strictly newer than every existing package of this codename.
    Replaces(Vec<&'a Package>),

    /// Not newer than this existing package.
    Conflict(&'a Package),
}

/// An accepted package and the existing packages it supersedes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub incoming: Package,
    pub superseded: Vec<Package>,
}

/// Outcome of resolving a batch of incoming packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Packages whose codename is not in the repository yet.
    pub additions: Vec<Package>,

    /// Packages that supersede existing ones.
    pub replacements: Vec<Replacement>,
}

impl Resolution {
    /// All accepted incoming packages.
    pub fn accepted(&self) -> impl Iterator<Item = &Package> {
        self.additions
            .iter()
            .chain(self.replacements.iter().map(|r| &r.incoming))
    }

    /// All existing packages to remove.
    pub fn superseded(&self) -> impl Iterator<Item = &Package> {
        self.replacements.iter().flat_map(|r| r.superseded.iter())
    }

    /// Number of accepted packages.
    pub fn len(&self) -> usize {
        self.additions.len() + self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.replacements.is_empty()
    }
}

/// Classify one incoming package against the existing packages sharing its codename.
pub fn classify<'a>(incoming: &Package, same_codename: &[&'a Package]) -> Classification<'a> {
    if same_codename.is_empty() {
        return Classification::New;
    }

    match same_codename
        .iter()
        .find(|existing| incoming.version <= existing.version)
    {
        Some(existing) => Classification::Conflict(*existing),
        None => Classification::Replaces(same_codename.to_vec()),
    }
}

/// Resolve a batch of incoming packages against a repository's packages.
///
/// Fails without a partial result if any incoming package conflicts, if two
/// incoming packages share a codename, or if an accepted file would overwrite
/// an existing file of a different module.
pub fn resolve(incoming: &[Package], existing: &[Package]) -> ResolveResult<Resolution> {
    let mut by_codename: HashMap<&str, Vec<&Package>> = HashMap::new();
    for package in existing {
        by_codename
            .entry(package.codename.as_str())
            .or_default()
            .push(package);
    }

    let mut seen: HashMap<&str, &Package> = HashMap::new();
    let mut resolution = Resolution::default();

    for package in incoming {
        if let Some(first) = seen.insert(package.codename.as_str(), package) {
            return Err(ResolveError::DuplicateCodename {
                codename: package.codename.clone(),
                first: first.file_name(),
                second: package.file_name(),
            });
        }

        let same_codename = by_codename
            .get(package.codename.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        match classify(package, same_codename) {
            Classification::New => resolution.additions.push(package.clone()),
            Classification::Replaces(superseded) => resolution.replacements.push(Replacement {
                incoming: package.clone(),
                superseded: superseded.into_iter().cloned().collect(),
            }),
            Classification::Conflict(existing) => {
                return Err(ResolveError::VersionConflict {
                    codename: package.codename.clone(),
                    incoming: package.file_name(),
                    incoming_version: package.version.clone(),
                    existing: existing.file_name(),
                    existing_version: existing.version.clone(),
                });
            }
        }
    }

    check_file_names(&resolution, existing)?;
    debug!(
        additions = resolution.additions.len(),
        replacements = resolution.replacements.len(),
        "Resolved incoming packages"
    );
    Ok(resolution)
}

/// Accepted files are copied by name; refuse to overwrite a file that is not superseded.
fn check_file_names(resolution: &Resolution, existing: &[Package]) -> ResolveResult<()> {
    let superseded: HashSet<&Path> = resolution.superseded().map(|p| p.path.as_path()).collect();

    for package in resolution.accepted() {
        let name = package.file_name();
        if let Some(other) = existing
            .iter()
            .find(|e| e.file_name() == name && !superseded.contains(e.path.as_path()))
        {
            return Err(ResolveError::FileNameCollision {
                file_name: name,
                incoming_codename: package.codename.clone(),
                existing_codename: other.codename.clone(),
            });
        }
    }
    Ok(())
}
