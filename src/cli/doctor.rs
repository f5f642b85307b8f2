use crate::models::Feature;
use crate::services::register_model;
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

#[derive(Debug)]
enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Ok => write!(f, "\x1b[32m✓ OK\x1b[0m"),
            CheckStatus::Warn => write!(f, "\x1b[33m⚠ WARN\x1b[0m"),
            CheckStatus::Fail => write!(f, "\x1b[31m✗ FAIL\x1b[0m"),
        }
    }
}

struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

pub fn run(config_path: &Path) -> Result<()> {
    println!("\n  polyslug doctor\n");

    let mut results: Vec<CheckResult> = Vec::new();

    let config = match Config::load(config_path) {
        Ok(c) => {
            results.push(CheckResult {
                name: "Configuration".into(),
                status: CheckStatus::Ok,
                detail: format!("Loaded from {}", config_path.display()),
            });
            c
        }
        Err(e) => {
            results.push(CheckResult {
                name: "Configuration".into(),
                status: CheckStatus::Fail,
                detail: format!("{:#}", e),
            });
            return finish(&results);
        }
    };

    if config.models.is_empty() {
        results.push(CheckResult {
            name: "Models".into(),
            status: CheckStatus::Warn,
            detail: "No models declared".into(),
        });
    }

    for model in &config.models {
        let name = format!("Model '{}'", model.name);
        match register_model(model.clone()) {
            Ok(registered) if model.uses(Feature::Finders) => results.push(CheckResult {
                name,
                status: CheckStatus::Warn,
                detail: format!(
                    "{:?} finder; the finders add-on cannot see translated slugs, remove it",
                    registered.finder_strategy()
                ),
            }),
            Ok(registered) => {
                let features: Vec<String> = registered
                    .config()
                    .features
                    .iter()
                    .map(|f| f.to_string())
                    .collect();
                results.push(CheckResult {
                    name,
                    status: CheckStatus::Ok,
                    detail: format!(
                        "{:?} finder ({})",
                        registered.finder_strategy(),
                        features.join(", ")
                    ),
                })
            }
            Err(e) => results.push(CheckResult {
                name,
                status: CheckStatus::Fail,
                detail: e.to_string(),
            }),
        }
    }

    match Database::open_with_pool_size(&config.database.path, config.database.pool_size) {
        Ok(db) => {
            match db.health_check() {
                Ok(true) => results.push(CheckResult {
                    name: "Database connectivity".into(),
                    status: CheckStatus::Ok,
                    detail: format!("Connected to {}", config.database.path),
                }),
                _ => results.push(CheckResult {
                    name: "Database connectivity".into(),
                    status: CheckStatus::Fail,
                    detail: "Health check returned unexpected result".into(),
                }),
            }

            let statuses = db.get_migration_status()?;
            let pending = statuses.iter().filter(|(_, ts)| ts.is_none()).count();
            results.push(if pending == 0 {
                CheckResult {
                    name: "Migration status".into(),
                    status: CheckStatus::Ok,
                    detail: format!("All {} migrations applied", statuses.len()),
                }
            } else {
                CheckResult {
                    name: "Migration status".into(),
                    status: CheckStatus::Warn,
                    detail: format!("{} pending. Run `polyslug migrate`", pending),
                }
            });
        }
        Err(e) => results.push(CheckResult {
            name: "Database connectivity".into(),
            status: CheckStatus::Fail,
            detail: format!("Cannot open: {}", e),
        }),
    }

    finish(&results)
}

fn finish(results: &[CheckResult]) -> Result<()> {
    for result in results {
        println!("  {:<28} {:<16} {}", result.name, result.status.to_string(), result.detail);
    }

    if results.iter().any(|r| matches!(r.status, CheckStatus::Fail)) {
        println!("\n  \x1b[31mSome checks failed. Fix the issues above before assigning slugs.\x1b[0m\n");
        anyhow::bail!("doctor found problems");
    }
    println!();
    Ok(())
}
