//! Verify command implementation

use anyhow::Result;
use lm_migrate::Runner;

use crate::cli::GlobalArgs;
use crate::commands::common::{load_project, report_failure};

/// Execute the verify command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_db()?;
    let store = project.store(&db);
    let source = project.source();

    let verified = Runner::new(&source, &store)
        .verify()
        .map_err(report_failure)?;

    if global.verbose {
        for filename in &verified {
            println!("  OK: {}", filename);
        }
    }
    println!("{} applied migration(s) verified", verified.len());
    Ok(())
}
