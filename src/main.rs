use clap::Parser;
use polyslug::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polyslug=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path }) => {
            polyslug::cli::init::run(path)?;
        }
        Some(Commands::Migrate { command }) => {
            polyslug::cli::migrate::run(&cli.config, command)?;
        }
        Some(Commands::Record { command }) => {
            polyslug::cli::record::run(&cli.config, command)?;
        }
        Some(Commands::Translate {
            model,
            id,
            locale,
            fields,
            assign,
        }) => {
            polyslug::cli::record::translate(&cli.config, &model, id, locale, &fields, assign)?;
        }
        Some(Commands::Assign {
            model,
            id,
            text,
            locale,
        }) => {
            polyslug::cli::slugs::assign(&cli.config, &model, id, text, locale)?;
        }
        Some(Commands::Rename {
            model,
            id,
            text,
            locale,
        }) => {
            polyslug::cli::slugs::rename(&cli.config, &model, id, &text, locale)?;
        }
        Some(Commands::Exists {
            model,
            slug,
            locale,
        }) => {
            polyslug::cli::slugs::exists(&cli.config, &model, &slug, locale)?;
        }
        Some(Commands::Find {
            model,
            slug,
            locale,
            json,
        }) => {
            polyslug::cli::slugs::find(&cli.config, &model, &slug, locale, json)?;
        }
        Some(Commands::History { id }) => {
            polyslug::cli::slugs::history(&cli.config, id)?;
        }
        Some(Commands::Doctor) => {
            polyslug::cli::doctor::run(&cli.config)?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
