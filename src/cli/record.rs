use super::RecordCommand;
use crate::models::RecordId;
use crate::services::{RegisteredModel, SlugEngine, TranslationStore};
use anyhow::Result;
use std::path::Path;

pub fn run(config_path: &Path, command: RecordCommand) -> Result<()> {
    let (config, db) = super::open(config_path)?;
    let engine = SlugEngine::new(&config, db)?;
    let store = engine.store();

    match command {
        RecordCommand::Add { model } => {
            engine.registry().get(&model)?;
            let id = store.create_record(&model)?;
            tracing::info!("Created {} {}", model, id);
            println!("{}", id);
        }
        RecordCommand::List { model } => {
            let records = store.list_records(&model)?;
            println!("{:<8} {:<12} {:<22} {}", "ID", "MODEL", "CREATED", "LOCALES");
            println!("{}", "-".repeat(60));
            for record in records {
                let locales: Vec<String> = store
                    .list_locales(record.id)?
                    .iter()
                    .map(|l| l.to_string())
                    .collect();
                println!(
                    "{:<8} {:<12} {:<22} {}",
                    record.id,
                    record.model,
                    record.created_at,
                    locales.join(",")
                );
            }
        }
        RecordCommand::Show { id, json } => {
            let id = RecordId(id);
            let record = store
                .get_record(id)?
                .ok_or_else(|| anyhow::anyhow!("Record {} not found", id))?;

            let mut translations = Vec::new();
            for locale in store.list_locales(id)? {
                if let Some(translation) = store.get_translation(id, &locale)? {
                    translations.push(translation);
                }
            }

            if json {
                let out = serde_json::json!({
                    "record": record,
                    "translations": translations,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{} {} (created {})", record.model, record.id, record.created_at);
                for translation in translations {
                    println!("  [{}]", translation.locale);
                    for (field, value) in &translation.fields {
                        println!("    {:<12} {}", field, value);
                    }
                }
            }
        }
    }

    Ok(())
}

pub fn translate(
    config_path: &Path,
    model: &str,
    id: i64,
    locale: Option<String>,
    fields: &[String],
    assign: bool,
) -> Result<()> {
    let (config, db) = super::open(config_path)?;
    let locale = super::parse_locale(&config, locale)?;
    let engine = SlugEngine::new(&config, db)?;
    let pairs = parse_fields(engine.registry().get(model)?, fields)?;

    let mut ctx = engine.context();
    let locale = locale.unwrap_or_else(|| ctx.current().clone());
    let id = RecordId(id);
    if engine.store().record_model(id)?.as_deref() != Some(model) {
        anyhow::bail!("{} {} not found", model, id);
    }
    engine.store().put_translation(id, &locale, &pairs)?;
    tracing::info!("Updated {} {} ({})", model, id, locale);

    if assign {
        let assigner = engine.assigner(model)?;
        for assignment in assigner.assign(&mut ctx, id, None)? {
            println!("{}\t{}", assignment.locale, assignment.slug);
        }
    }

    Ok(())
}

/// Splits `field=value` arguments, accepting only translated fields other
/// than the slug field. Slugs are written by `assign` and `rename`, which
/// check them for conflicts.
pub(crate) fn parse_fields<'a>(
    model: &RegisteredModel,
    fields: &'a [String],
) -> Result<Vec<(&'a str, &'a str)>> {
    let mut pairs = Vec::with_capacity(fields.len());
    for field in fields {
        let (name, value) = field
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected field=value, got '{}'", field))?;
        if name == model.slug_field() {
            anyhow::bail!(
                "Field '{}' holds the slug; use `polyslug rename` to change it",
                name
            );
        }
        if !model.config().is_translated(name) {
            anyhow::bail!("Field '{}' is not translated on model '{}'", name, model.name());
        }
        pairs.push((name, value));
    }
    Ok(pairs)
}
