//! Reading identity and metadata out of `.nbm` archives.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use super::core::Package;
use super::error::{PackageError, PackageResult};
use super::metadata::ModuleEntry;
use super::version::SpecVersion;
use crate::xml::{Document, Element};

/// Path of the metadata entry inside every `.nbm` archive.
pub const INFO_ENTRY: &str = "Info/info.xml";

/// File extension of module packages.
pub const NBM_EXTENSION: &str = "nbm";

pub(crate) const MODULE_ELEMENT: &str = "module";
pub(crate) const CODENAME_ATTRIBUTE: &str = "codenamebase";
pub(crate) const MANIFEST_ELEMENT: &str = "manifest";
pub(crate) const SPEC_VERSION_ATTRIBUTE: &str = "OpenIDE-Module-Specification-Version";

/// Read and parse the `Info/info.xml` root of an archive.
fn read_info(path: &Path) -> PackageResult<Element> {
    let file = File::open(path).map_err(|e| PackageError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut archive = ZipArchive::new(file)
        .map_err(|e| PackageError::malformed(path, format!("not a zip archive: {}", e)))?;

    let mut content = String::new();
    {
        let mut entry = archive
            .by_name(INFO_ENTRY)
            .map_err(|_| PackageError::malformed(path, format!("missing {}", INFO_ENTRY)))?;
        entry
            .read_to_string(&mut content)
            .map_err(|e| PackageError::malformed(path, format!("unreadable {}: {}", INFO_ENTRY, e)))?;
    }

    let document = Document::parse(&content)
        .map_err(|e| PackageError::malformed(path, format!("invalid {}: {}", INFO_ENTRY, e)))?;

    if document.root.name() != MODULE_ELEMENT {
        return Err(PackageError::malformed(
            path,
            format!("unexpected root element <{}>", document.root.name()),
        ));
    }

    Ok(document.root)
}

fn codename_of(info: &Element, path: &Path) -> PackageResult<String> {
    info.attribute(CODENAME_ATTRIBUTE)
        .map(str::trim)
        .filter(|codename| !codename.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PackageError::malformed(path, "module has no codenamebase"))
}

fn version_of(info: &Element, path: &Path) -> PackageResult<SpecVersion> {
    let raw = info
        .child_elements()
        .filter(|child| child.name() == MANIFEST_ELEMENT)
        .find_map(|manifest| manifest.attribute(SPEC_VERSION_ATTRIBUTE))
        .ok_or_else(|| PackageError::MissingVersionInfo(path.to_path_buf()))?;

    raw.parse().map_err(|_| PackageError::InvalidVersion {
        path: path.to_path_buf(),
        version: raw.to_string(),
    })
}

/// Codename (`codenamebase`) of the module in an archive.
pub fn extract_codename(path: &Path) -> PackageResult<String> {
    codename_of(&read_info(path)?, path)
}

/// Specification version from the archive's `manifest` element.
pub fn extract_version(path: &Path) -> PackageResult<SpecVersion> {
    version_of(&read_info(path)?, path)
}

/// Catalog metadata for an archive, with `downloadsize` set to its size on disk.
pub fn extract_metadata(path: &Path) -> PackageResult<ModuleEntry> {
    let info = read_info(path)?;
    let size = fs::metadata(path)
        .map_err(|e| PackageError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?
        .len();
    ModuleEntry::from_info(&info, size, path)
}

/// Codename and version of an archive from a single read of its metadata.
pub fn inspect(path: &Path) -> PackageResult<Package> {
    let info = read_info(path)?;
    Ok(Package::new(
        codename_of(&info, path)?,
        version_of(&info, path)?,
        path,
    ))
}

/// Check whether a path is a regular file with the `.nbm` extension.
pub fn is_nbm(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext == NBM_EXTENSION)
            .unwrap_or(false)
}

/// List the `.nbm` files directly inside a directory, sorted by file name.
pub fn list_nbms(dir: &Path) -> PackageResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| PackageError::ReadFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut nbms = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PackageError::ReadFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if is_nbm(&path) {
            nbms.push(path);
        }
    }

    nbms.sort();
    Ok(nbms)
}

/// Inspect every `.nbm` file in a directory.
pub fn inspect_directory(dir: &Path) -> PackageResult<Vec<Package>> {
    let packages = list_nbms(dir)?
        .iter()
        .map(|path| inspect(path))
        .collect::<PackageResult<Vec<_>>>()?;
    debug!(dir = %dir.display(), count = packages.len(), "Inspected packages");
    Ok(packages)
}
