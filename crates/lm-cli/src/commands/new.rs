//! New command implementation

use anyhow::Result;
use chrono::Utc;

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::{load_project, report_failure};

/// Execute the new command
pub(crate) fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let path = project
        .source()
        .create(&args.name, Utc::now())
        .map_err(report_failure)?;

    println!("Created {}", path.display());
    Ok(())
}
