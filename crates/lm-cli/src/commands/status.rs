//! Status command implementation

use anyhow::{Context, Result};
use lm_migrate::{MigrationState, MigrationStatus, Runner};

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{load_project, report_failure};

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_db()?;
    let store = project.store(&db);
    let source = project.source();

    let status = Runner::new(&source, &store)
        .status()
        .map_err(report_failure)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&status).context("Failed to serialize status")?;
        println!("{json}");
        return Ok(());
    }

    print_table(&status);
    Ok(())
}

/// Human-readable label and applied time for one row.
fn describe(state: &MigrationState) -> (&'static str, String) {
    match state {
        MigrationState::Applied {
            applied_at,
            checksum_matches: true,
        } => ("applied", applied_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        MigrationState::Applied {
            applied_at,
            checksum_matches: false,
        } => ("MODIFIED", applied_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        MigrationState::Pending => ("pending", "-".to_string()),
        MigrationState::Missing { applied_at } => {
            ("missing", applied_at.format("%Y-%m-%d %H:%M:%S").to_string())
        }
    }
}

fn print_table(status: &[MigrationStatus]) {
    if status.is_empty() {
        println!("No migrations found");
        return;
    }

    let width = status
        .iter()
        .map(|s| s.filename.len())
        .max()
        .unwrap_or(0)
        .max("MIGRATION".len());

    println!("{:<width$}  {:<8}  APPLIED AT (UTC)", "MIGRATION", "STATE");
    for row in status {
        let (label, applied_at) = describe(&row.state);
        println!("{:<width$}  {:<8}  {}", row.filename.as_str(), label, applied_at);
    }

    let pending = status
        .iter()
        .filter(|s| s.state == MigrationState::Pending)
        .count();
    let modified = status
        .iter()
        .filter(|s| {
            matches!(
                s.state,
                MigrationState::Applied {
                    checksum_matches: false,
                    ..
                }
            )
        })
        .count();
    println!();
    println!("{} migration(s), {} pending, {} modified", status.len(), pending, modified);
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
