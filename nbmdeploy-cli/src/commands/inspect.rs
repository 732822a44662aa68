//! Inspect command - show the metadata of nbm files.

use std::path::PathBuf;

use nbmdeploy::package::{extract_metadata, inspect};

use super::output::{print_package, Output};
use crate::error::CliError;

/// Run the inspect command.
pub fn run(nbms: &[PathBuf], out: &dyn Output) -> Result<(), CliError> {
    for (i, path) in nbms.iter().enumerate() {
        let package = inspect(path)?;
        let entry = extract_metadata(path)?;
        if i > 0 {
            out.newline();
        }
        print_package(out, &package, &entry);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::output::testing::BufferOutput;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_nbm(dir: &Path, name: &str, info: &str) -> PathBuf {
        let path = dir.join(name);
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("Info/info.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(info.as_bytes()).unwrap();
        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_prints_package_details() {
        let temp = TempDir::new().unwrap();
        let licensed = write_nbm(
            temp.path(),
            "core.nbm",
            r#"<module codenamebase="org.example.core" distribution="core.nbm">
  <manifest OpenIDE-Module="org.example.core" OpenIDE-Module-Name="Core" OpenIDE-Module-Specification-Version="3.10"/>
  <license name="EPL-1.0">Eclipse Public License</license>
</module>"#,
        );
        let plain = write_nbm(
            temp.path(),
            "util.nbm",
            r#"<module codenamebase="org.example.util"><manifest OpenIDE-Module-Specification-Version="1.2"/></module>"#,
        );
        let size = std::fs::metadata(&licensed).unwrap().len();

        let out = BufferOutput::default();
        run(&[licensed, plain], &out).unwrap();

        assert_eq!(
            out.lines(),
            vec![
                "# core.nbm".to_string(),
                "  Codename:  org.example.core".to_string(),
                "  Version:   3.10".to_string(),
                format!("  Size:      {} bytes", size),
                "  License:   EPL-1.0".to_string(),
                String::new(),
                "# util.nbm".to_string(),
                "  Codename:  org.example.util".to_string(),
                "  Version:   1.2".to_string(),
                format!("  Size:      {} bytes", std::fs::metadata(temp.path().join("util.nbm")).unwrap().len()),
                "  License:   (none)".to_string(),
            ]
        );
    }

    #[test]
    fn test_broken_package_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.nbm");
        std::fs::write(&path, b"not a zip").unwrap();

        let out = BufferOutput::default();
        let err = run(&[path], &out).unwrap_err();
        assert!(matches!(err, CliError::Package(_)));
        assert!(out.lines().is_empty());
    }
}
