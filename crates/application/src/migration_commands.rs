//! Console front end for the migration runner. Output goes to any writer so
//! the binaries print to stdout and tests capture it.

use infrastructure::{MigrationResult, MigrationRunner, MigrationStatus};
use std::io::{self, Write};
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrateCommand {
    /// Apply every pending migration.
    Latest,
    /// Show the ledger against the known migrations.
    Status,
    /// Apply pending migrations up to and including this version.
    ToVersion(String),
}

/// Runs a migration command and returns the process exit code.
pub async fn run_migration_command<W: Write>(
    runner: &MigrationRunner,
    command: &MigrateCommand,
    out: &mut W,
) -> io::Result<i32> {
    match command {
        MigrateCommand::Latest => {
            writeln!(out, "Running migrations to latest version...")?;
            let result = runner.migrate_to_latest().await;
            write_result(&result, out)
        }
        MigrateCommand::ToVersion(target) => {
            writeln!(out, "Running migrations to version {}...", target)?;
            let result = runner.migrate_to_version(target).await;
            write_result(&result, out)
        }
        MigrateCommand::Status => match runner.status().await {
            Ok(status) => {
                write_status(&status, out)?;
                Ok(0)
            }
            Err(e) => {
                error!("Migration command failed: {}", e);
                writeln!(out, "Error: {}", e)?;
                Ok(1)
            }
        },
    }
}

pub fn write_result<W: Write>(result: &MigrationResult, out: &mut W) -> io::Result<i32> {
    let elapsed = result.duration.as_millis();

    if !result.success {
        writeln!(out, "❌ Migration failed after {}ms", elapsed)?;
        writeln!(out, "Error: {}", result.error_message.as_deref().unwrap_or_default())?;
        if !result.applied_migrations.is_empty() {
            writeln!(out, "Migrations applied before failure:")?;
            for version in &result.applied_migrations {
                writeln!(out, "  ✓ {}", version)?;
            }
        }
        return Ok(1);
    }

    writeln!(out, "✅ Migration completed successfully in {}ms", elapsed)?;

    if !result.applied_migrations.is_empty() {
        writeln!(out, "Applied migrations ({}):", result.applied_migrations.len())?;
        for version in &result.applied_migrations {
            writeln!(out, "  ✓ {}", version)?;
        }
    }

    if !result.skipped_migrations.is_empty() {
        writeln!(out, "Skipped migrations ({}):", result.skipped_migrations.len())?;
        for version in &result.skipped_migrations {
            writeln!(out, "  - {} (already applied)", version)?;
        }
    }

    if result.is_noop() {
        writeln!(out, "No migrations to apply - database is up to date.")?;
    }

    Ok(0)
}

pub fn write_status<W: Write>(status: &MigrationStatus, out: &mut W) -> io::Result<()> {
    writeln!(out, "Migration Status:")?;
    writeln!(out, "================")?;
    writeln!(
        out,
        "Current Version: {}",
        status.current_version.as_deref().unwrap_or("None")
    )?;
    writeln!(out, "Applied Migrations: {}", status.applied.len())?;
    writeln!(out, "Pending Migrations: {}", status.pending.len())?;
    writeln!(out)?;

    if !status.applied.is_empty() {
        writeln!(out, "Applied Migrations:")?;
        for record in &status.applied {
            writeln!(
                out,
                "  ✓ {} - {} (applied {} UTC)",
                record.version,
                record.description,
                record.applied_at.format("%Y-%m-%d %H:%M:%S")
            )?;
        }
        writeln!(out)?;
    }

    if status.pending.is_empty() {
        writeln!(out, "✅ Database is up to date - no pending migrations.")?;
    } else {
        writeln!(out, "Pending Migrations:")?;
        for version in &status.pending {
            writeln!(out, "  ⏳ {}", version)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure::{InMemoryDocumentStore, MigrationRegistry};
    use std::sync::Arc;
    use std::time::Duration;

    fn runner() -> MigrationRunner {
        MigrationRunner::new(
            Arc::new(InMemoryDocumentStore::new()),
            MigrationRegistry::with_defaults(),
        )
    }

    async fn run(runner: &MigrationRunner, command: MigrateCommand) -> (i32, String) {
        let mut out = Vec::new();
        let code = run_migration_command(runner, &command, &mut out).await.unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn migrate_then_migrate_again() {
        let runner = runner();

        let (code, output) = run(&runner, MigrateCommand::Latest).await;
        assert_eq!(code, 0);
        assert!(output.contains("Applied migrations (2):\n  ✓ 001\n  ✓ 002\n"));

        let (code, output) = run(&runner, MigrateCommand::Latest).await;
        assert_eq!(code, 0);
        assert!(output.contains("Skipped migrations (2):\n  - 001 (already applied)\n"));
    }

    #[tokio::test]
    async fn status_lists_pending_then_up_to_date() {
        let runner = runner();

        let (code, output) = run(&runner, MigrateCommand::Status).await;
        assert_eq!(code, 0);
        assert!(output.contains("Current Version: None\n"));
        assert!(output.contains("Pending Migrations:\n  ⏳ 001\n  ⏳ 002\n"));

        run(&runner, MigrateCommand::ToVersion("001".into())).await;
        let (_, output) = run(&runner, MigrateCommand::Status).await;
        assert!(output.contains("Current Version: 001\n"));
        assert!(output.contains("  ✓ 001 - Initial database setup with collections, schemas, and indexes (applied "));
        assert!(output.contains("  ⏳ 002\n"));

        run(&runner, MigrateCommand::Latest).await;
        let (_, output) = run(&runner, MigrateCommand::Status).await;
        assert!(output.ends_with("✅ Database is up to date - no pending migrations.\n"));
    }

    #[tokio::test]
    async fn unknown_target_exits_with_failure() {
        let (code, output) = run(&runner(), MigrateCommand::ToVersion("042".into())).await;
        assert_eq!(code, 1);
        assert!(output.contains("❌ Migration failed after "));
        assert!(output.contains("Error: Migration version 042 not found\n"));
        assert!(!output.contains("Migrations applied before failure"));
    }

    #[test]
    fn empty_success_reports_up_to_date() {
        let result = MigrationResult::successful(Vec::new(), Vec::new(), Duration::from_millis(3));
        let mut out = Vec::new();
        assert_eq!(write_result(&result, &mut out).unwrap(), 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "✅ Migration completed successfully in 3ms\nNo migrations to apply - database is up to date.\n"
        );
    }

    #[test]
    fn failure_lists_what_was_applied() {
        let result = MigrationResult::failed(
            "Migration 003 failed: boom",
            vec!["001".into(), "002".into()],
            Vec::new(),
            Duration::from_millis(12),
        );
        let mut out = Vec::new();
        assert_eq!(write_result(&result, &mut out).unwrap(), 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "❌ Migration failed after 12ms\nError: Migration 003 failed: boom\n\
             Migrations applied before failure:\n  ✓ 001\n  ✓ 002\n"
        );
    }
}
