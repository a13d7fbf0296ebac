//! Migrate command implementation

use anyhow::Result;
use lm_migrate::Runner;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{load_project, report_failure};

/// Execute the migrate command
pub(crate) fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_db()?;
    let store = project.store(&db);
    let source = project.source();
    let runner = Runner::new(&source, &store);

    if args.dry_run {
        let plan = runner.plan().map_err(report_failure)?;
        println!(
            "Dry run: {} applied migration(s) verified, {} pending",
            plan.verified.len(),
            plan.pending.len()
        );
        for definition in &plan.pending {
            println!("  Would apply: {}", definition.filename);
        }
        for record in &plan.missing {
            println!("  Missing from source: {}", record.filename);
        }
        return Ok(());
    }

    let report = runner.run().map_err(report_failure)?;

    for filename in &report.applied {
        println!("  Applied: {}", filename);
    }
    println!();
    if report.applied.is_empty() {
        println!(
            "Database is up to date ({} migration(s) verified)",
            report.verified
        );
    } else {
        println!(
            "Applied {} migration(s), {} already applied, in {}ms",
            report.applied.len(),
            report.verified,
            report.elapsed_ms
        );
    }

    Ok(())
}
