use crate::models::RecordId;
use crate::services::{HistoryStore, LocaleContext, SlugEngine};
use anyhow::Result;
use std::path::Path;

pub fn assign(
    config_path: &Path,
    model: &str,
    id: i64,
    text: Option<String>,
    locale: Option<String>,
) -> Result<()> {
    let (config, db) = super::open(config_path)?;
    let locale = super::parse_locale(&config, locale)?;
    let engine = SlugEngine::new(&config, db)?;
    let assigner = engine.assigner(model)?;
    let mut ctx = engine.context();
    let id = RecordId(id);

    let assignments = match (locale, text.as_deref()) {
        (Some(locale), Some(text)) => assigner
            .set_slug_for(&mut ctx, id, text, Some(&locale))?
            .into_iter()
            .collect(),
        (_, text) => assigner.assign(&mut ctx, id, text)?,
    };

    if assignments.is_empty() {
        tracing::info!("{} {} already has slugs for every locale", model, id);
    }
    for assignment in assignments {
        println!("{}\t{}", assignment.locale, assignment.slug);
    }

    Ok(())
}

pub fn rename(
    config_path: &Path,
    model: &str,
    id: i64,
    text: &str,
    locale: Option<String>,
) -> Result<()> {
    let (config, db) = super::open(config_path)?;
    let locale = super::parse_locale(&config, locale)?;
    let engine = SlugEngine::new(&config, db)?;
    let assigner = engine.assigner(model)?;

    if !assigner.model().uses_history() {
        tracing::warn!(
            "Model '{}' keeps no slug history; links using the old slug will stop resolving",
            model
        );
    }

    let mut ctx = engine.context();
    let locale = locale.unwrap_or_else(|| ctx.current().clone());
    let assignment = ctx.with_locale(&locale, |ctx| assigner.rename(ctx, RecordId(id), text))?;
    println!("{}\t{}", assignment.locale, assignment.slug);

    Ok(())
}

pub fn exists(config_path: &Path, model: &str, slug: &str, locale: Option<String>) -> Result<()> {
    let (config, db) = super::open(config_path)?;
    let locale = super::parse_locale(&config, locale)?;
    let engine = SlugEngine::new(&config, db)?;
    let finder = engine.finder(model)?;
    let ctx = context_for(&engine, locale);

    let exists = finder.exists_by_slug(&ctx, slug)?;
    println!("{}", exists);
    if !exists {
        std::process::exit(1);
    }

    Ok(())
}

pub fn find(
    config_path: &Path,
    model: &str,
    slug: &str,
    locale: Option<String>,
    json: bool,
) -> Result<()> {
    let (config, db) = super::open(config_path)?;
    let locale = super::parse_locale(&config, locale)?;
    let engine = SlugEngine::new(&config, db)?;
    let finder = engine.finder(model)?;
    let ctx = context_for(&engine, locale);

    let Some(id) = finder.find_by_slug(&ctx, slug)? else {
        anyhow::bail!("No {} with slug '{}'", model, slug);
    };

    let translation = engine.store().get_translation(id, ctx.current())?;
    if json {
        let out = serde_json::json!({
            "id": id,
            "model": model,
            "strategy": finder.strategy(),
            "translation": translation,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", id);
    }

    Ok(())
}

pub fn history(config_path: &Path, id: i64) -> Result<()> {
    let (config, db) = super::open(config_path)?;
    let engine = SlugEngine::new(&config, db)?;
    let entries = engine.store().list(RecordId(id))?;

    println!("{:<6} {:<8} {:<40} {}", "ID", "LOCALE", "SLUG", "CREATED");
    println!("{}", "-".repeat(80));
    for entry in entries {
        println!(
            "{:<6} {:<8} {:<40} {}",
            entry.id,
            entry.locale.map(|l| l.to_string()).unwrap_or_else(|| "-".into()),
            entry.slug,
            entry.created_at
        );
    }

    Ok(())
}

fn context_for(engine: &SlugEngine, locale: Option<crate::models::Locale>) -> LocaleContext {
    match locale {
        Some(locale) => LocaleContext::new(locale),
        None => engine.context(),
    }
}
