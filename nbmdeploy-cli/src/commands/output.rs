//! Output formatting shared by the commands.

use console::style;
use nbmdeploy::catalog::CatalogSummary;
use nbmdeploy::deploy::{DeployReport, ReportEntry};
use nbmdeploy::package::{ModuleEntry, Package};

/// Where command output goes.
pub trait Output {
    fn header(&self, text: &str);
    fn println(&self, text: &str);
    fn indented(&self, text: &str);
    fn success(&self, text: &str);
    fn warning(&self, text: &str);
    fn newline(&self);
}

/// Styled output on stdout.
pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn header(&self, text: &str) {
        println!("{}", style(text).bold().cyan());
    }

    fn println(&self, text: &str) {
        println!("{}", text);
    }

    fn indented(&self, text: &str) {
        println!("  {}", text);
    }

    fn success(&self, text: &str) {
        println!("{} {}", style("✓").green().bold(), text);
    }

    fn warning(&self, text: &str) {
        println!("{} {}", style("!").yellow().bold(), style(text).yellow());
    }

    fn newline(&self) {
        println!();
    }
}

/// Print the outcome of a deployment.
pub fn print_deploy_report(out: &dyn Output, report: &DeployReport) {
    let title = if report.dry_run {
        format!("Planned deployment to {} / {}", report.release, report.repository)
    } else {
        format!("Deployment to {} / {}", report.release, report.repository)
    };
    out.header(&title);
    out.newline();

    if report.entries.is_empty() {
        out.println("No packages to deploy.");
    }
    for entry in &report.entries {
        match entry {
            ReportEntry::Replacing { .. } => out.warning(&entry.to_string()),
            ReportEntry::Deploying { .. } => out.indented(&entry.to_string()),
        }
    }

    if let Some(catalog) = &report.catalog {
        out.newline();
        for warning in &catalog.warnings {
            out.warning(&warning.to_string());
        }
        out.success(&format!(
            "Published {} ({} modules, {} licenses)",
            catalog.xml_path.display(),
            catalog.module_count,
            catalog.license_count
        ));
    }
    if let Some(snapshot) = &report.snapshot {
        out.success(&format!("Release {} now serves {}", report.release, snapshot));
    }
    if report.dry_run {
        out.newline();
        out.println("Dry run: the update center was not modified.");
    }
}

/// Print one inspected package.
pub fn print_package(out: &dyn Output, package: &Package, entry: &ModuleEntry) {
    out.header(&package.file_name());
    out.indented(&format!("Codename:  {}", package.codename));
    out.indented(&format!("Version:   {}", package.version));
    if let Some(size) = entry.download_size() {
        out.indented(&format!("Size:      {} bytes", size));
    }
    match entry.license() {
        Some(license) => out.indented(&format!("License:   {}", license.name())),
        None => out.indented("License:   (none)"),
    }
}

/// Print a validated catalog.
pub fn print_catalog_summary(out: &dyn Output, name: &str, summary: &CatalogSummary) {
    out.success(&format!("{} is a valid catalog", name));
    if let Some(timestamp) = &summary.timestamp {
        out.indented(&format!("Timestamp:     {}", timestamp));
    }
    if let Some(notification) = &summary.notification {
        out.indented(&format!("Notification:  {}", notification));
    }
    out.indented(&format!("Modules:       {}", summary.modules.len()));
    for (codename, version) in &summary.modules {
        out.indented(&format!("  {} {}", codename, version));
    }
    let licenses: Vec<&str> = summary.licenses.iter().map(String::as_str).collect();
    out.indented(&format!("Licenses:      {}", licenses.join(", ")));
}
