//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Builder for `.nbm` fixture archives.
pub struct NbmBuilder {
    codename: String,
    version: String,
    license: Option<(String, String)>,
}

impl NbmBuilder {
    pub fn new(codename: &str, version: &str) -> Self {
        Self {
            codename: codename.to_string(),
            version: version.to_string(),
            license: None,
        }
    }

    pub fn license(mut self, name: &str, text: &str) -> Self {
        self.license = Some((name.to_string(), text.to_string()));
        self
    }

    pub fn info_xml(&self) -> String {
        let (license_attr, license_element) = match &self.license {
            Some((name, text)) => (
                format!(" license=\"{}\"", name),
                format!("  <license name=\"{}\">{}</license>\n", name, text),
            ),
            None => (String::new(), String::new()),
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE module PUBLIC "-//NetBeans//DTD Autoupdate Module Info 2.5//EN" "http://www.netbeans.org/dtds/autoupdate-info-2_5.dtd">
<module codenamebase="{codename}" distribution="{codename}.nbm" downloadsize="0" homepage="http://step.esa.int"{license_attr} moduleauthor="Tests" needsrestart="false" releasedate="2016/03/01">
  <manifest AutoUpdate-Show-In-Client="true" OpenIDE-Module="{codename}" OpenIDE-Module-Name="{codename}" OpenIDE-Module-Specification-Version="{version}"/>
{license_element}</module>
"#,
            codename = self.codename,
            version = self.version,
        )
    }

    /// Write the archive as `dir/file_name`.
    pub fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(file_name);
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("Info/info.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(self.info_xml().as_bytes()).unwrap();
        zip.start_file("netbeans/modules/module.jar", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(self.codename.as_bytes()).unwrap();
        zip.finish().unwrap();
        path
    }
}

/// Scratch update-center root plus a directory for incoming packages.
pub struct Workspace {
    pub temp: TempDir,
    pub root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("updatecenter");
        fs::create_dir_all(&root).unwrap();
        Self { temp, root }
    }

    /// A fresh, empty directory for one batch of incoming packages.
    pub fn incoming(&self, name: &str) -> PathBuf {
        let dir = self.temp.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Number of entries directly under the update-center root.
    pub fn root_entries(&self) -> usize {
        fs::read_dir(&self.root).unwrap().count()
    }
}
