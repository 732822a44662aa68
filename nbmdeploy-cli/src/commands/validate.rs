//! Validate command - check an existing catalog against the DTD.

use std::path::Path;

use nbmdeploy::catalog::validate_catalog_file;

use super::output::{print_catalog_summary, Output};
use crate::error::CliError;

/// Run the validate command.
pub fn run(catalog: &Path, out: &dyn Output) -> Result<(), CliError> {
    let summary = validate_catalog_file(catalog)?;
    print_catalog_summary(out, &catalog.display().to_string(), &summary);
    Ok(())
}
