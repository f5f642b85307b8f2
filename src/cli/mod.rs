pub mod doctor;
pub mod init;
pub mod migrate;
pub mod record;
pub mod slugs;

use crate::models::Locale;
use crate::{Config, Database};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "polyslug")]
#[command(version)]
#[command(about = "Per-locale slugs for translated records", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "polyslug.toml", env = "POLYSLUG_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter polyslug.toml
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    Migrate {
        #[command(subcommand)]
        command: Option<MigrateCommand>,
    },
    Record {
        #[command(subcommand)]
        command: RecordCommand,
    },
    /// Set translated fields of a record in one locale
    Translate {
        model: String,
        id: i64,
        #[arg(short, long)]
        locale: Option<String>,
        /// field=value pairs
        #[arg(required = true)]
        fields: Vec<String>,
        /// Fill in missing slugs afterwards
        #[arg(long)]
        assign: bool,
    },
    /// Fill in missing slugs for every locale of a record
    Assign {
        model: String,
        id: i64,
        /// Build slugs from this text instead of the base field
        #[arg(long)]
        text: Option<String>,
        /// Only this locale (requires --text)
        #[arg(short, long, requires = "text")]
        locale: Option<String>,
    },
    /// Replace a record's slug in one locale, keeping the old one in history
    Rename {
        model: String,
        id: i64,
        text: String,
        #[arg(short, long)]
        locale: Option<String>,
    },
    Exists {
        model: String,
        slug: String,
        #[arg(short, long)]
        locale: Option<String>,
    },
    Find {
        model: String,
        slug: String,
        #[arg(short, long)]
        locale: Option<String>,
        #[arg(long)]
        json: bool,
    },
    History {
        id: i64,
    },
    /// Check configuration, models and database
    Doctor,
}

#[derive(Subcommand)]
pub enum MigrateCommand {
    Status,
}

#[derive(Subcommand)]
pub enum RecordCommand {
    Add {
        model: String,
    },
    List {
        model: String,
    },
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },
}

pub(crate) fn open(config_path: &Path) -> anyhow::Result<(Config, Database)> {
    let config = Config::load(config_path)?;
    let db = Database::open_with_pool_size(&config.database.path, config.database.pool_size)?;
    Ok((config, db))
}

pub(crate) fn parse_locale(config: &Config, locale: Option<String>) -> anyhow::Result<Option<Locale>> {
    match locale {
        Some(l) if !config.locale.is_available(&l) => {
            anyhow::bail!(
                "Locale '{}' is not available. Available locales: {}",
                l,
                config.locale.available.join(", ")
            )
        }
        Some(l) => Ok(Some(Locale::new(l))),
        None => Ok(None),
    }
}
