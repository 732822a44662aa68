//! Fixture helpers for unit tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write a zip archive with the given entries.
pub(crate) fn write_zip(dir: &Path, file_name: &str, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(file_name);
    let file = File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

/// Write an `.nbm` archive with the given `Info/info.xml` content.
pub(crate) fn write_nbm(dir: &Path, file_name: &str, info: &str) -> PathBuf {
    write_zip(
        dir,
        file_name,
        &[
            ("Info/info.xml", info),
            ("netbeans/modules/module.jar", "jar bytes"),
        ],
    )
}

/// A catalog-valid `info.xml` document.
pub(crate) fn info_xml(codename: &str, version: &str, license: Option<(&str, &str)>) -> String {
    let license_attr = license
        .map(|(name, _)| format!(" license=\"{}\"", name))
        .unwrap_or_default();
    let license_element = license
        .map(|(name, text)| format!("  <license name=\"{}\">{}</license>\n", name, text))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE module PUBLIC "-//NetBeans//DTD Autoupdate Module Info 2.5//EN" "http://www.netbeans.org/dtds/autoupdate-info-2_5.dtd">
<module codenamebase="{codename}" distribution="{codename}.nbm" downloadsize="0" homepage="http://step.esa.int"{license_attr} needsrestart="false" releasedate="2015/11/20">
  <description>Module {codename}</description>
  <manifest AutoUpdate-Show-In-Client="true" OpenIDE-Module="{codename}" OpenIDE-Module-Implementation-Version="{version}" OpenIDE-Module-Name="{codename}" OpenIDE-Module-Specification-Version="{version}"/>
{license_element}</module>
"#
    )
}

/// Write a catalog-valid module package without a license.
pub(crate) fn write_module(dir: &Path, file_name: &str, codename: &str, version: &str) -> PathBuf {
    write_nbm(dir, file_name, &info_xml(codename, version, None))
}

/// Write a catalog-valid module package carrying a license.
pub(crate) fn write_licensed_module(
    dir: &Path,
    file_name: &str,
    codename: &str,
    version: &str,
    license: (&str, &str),
) -> PathBuf {
    write_nbm(dir, file_name, &info_xml(codename, version, Some(license)))
}
