use crate::cli::MigrateCommand;
use crate::Database;
use anyhow::Result;
use std::path::Path;

const DESCRIPTIONS: [&str; 2] = [
    "Records and per-locale translations",
    "Slug history",
];

pub fn run(config_path: &Path, command: Option<MigrateCommand>) -> Result<()> {
    let (_, db) = super::open(config_path)?;

    match command {
        None => {
            db.migrate()?;
            tracing::info!("Migrations complete");
        }
        Some(MigrateCommand::Status) => {
            show_status(&db)?;
        }
    }

    Ok(())
}

fn show_status(db: &Database) -> Result<()> {
    let statuses = db.get_migration_status()?;

    println!("\n  Migration Status\n");
    println!("  {:<10} {:<40} {}", "Version", "Description", "Applied");
    println!("  {}", "-".repeat(72));

    for (version, applied_at) in &statuses {
        let desc = DESCRIPTIONS
            .get((*version as usize).saturating_sub(1))
            .unwrap_or(&"Unknown migration");

        let applied = match applied_at {
            Some(ts) => format!("\x1b[32m✓\x1b[0m {}", ts),
            None => "\x1b[33m✗ pending\x1b[0m".to_string(),
        };

        println!("  {:<10} {:<40} {}", format!("{:03}", version), desc, applied);
    }

    let applied_count = statuses.iter().filter(|(_, ts)| ts.is_some()).count();
    let pending_count = statuses.len() - applied_count;

    println!();
    if pending_count > 0 {
        println!(
            "  {} applied, {} pending. Run `polyslug migrate` to apply.",
            applied_count, pending_count
        );
    } else {
        println!("  All {} migrations applied.", applied_count);
    }
    println!();

    Ok(())
}
