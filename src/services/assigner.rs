//! Per-locale slug assignment.
//!
//! Every locale of a record gets its own slug, generated from that locale's
//! base text the first time the locale has none. Existing slugs are left
//! alone, so editing one translation never changes another's slug.

use crate::error::{SlugError, SlugResult};
use crate::models::{Assignment, Locale, RecordId};
use crate::services::candidates::Candidates;
use crate::services::generator::{CandidateGenerator, ConflictResolver};
use crate::services::locale::LocaleContext;
use crate::services::normalize::Normalizer;
use crate::services::registry::RegisteredModel;
use crate::services::store::{HistoryStore, TranslationStore};
use anyhow::Result;
use std::sync::Arc;

/// Locales an assignment has to visit: those the record has translations
/// for, or just the current locale for a record without any.
pub fn locales_to_process(
    store: &dyn TranslationStore,
    record: RecordId,
    ctx: &LocaleContext,
) -> Result<Vec<Locale>> {
    let locales = store.list_locales(record)?;
    if locales.is_empty() {
        Ok(vec![ctx.current().clone()])
    } else {
        Ok(locales)
    }
}

pub struct SlugAssigner {
    model: RegisteredModel,
    store: Arc<dyn TranslationStore>,
    normalizer: Arc<dyn Normalizer>,
    generator: Arc<dyn CandidateGenerator>,
    resolver: Arc<dyn ConflictResolver>,
    history: Option<Arc<dyn HistoryStore>>,
}

impl SlugAssigner {
    pub fn new(
        model: RegisteredModel,
        store: Arc<dyn TranslationStore>,
        normalizer: Arc<dyn Normalizer>,
        generator: Arc<dyn CandidateGenerator>,
        resolver: Arc<dyn ConflictResolver>,
    ) -> Self {
        Self {
            model,
            store,
            normalizer,
            generator,
            resolver,
            history: None,
        }
    }

    /// Record every written slug in `history`.
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn model(&self) -> &RegisteredModel {
        &self.model
    }

    /// Fills in missing slugs for every locale of `record`.
    ///
    /// `explicit_text` replaces each locale's base text when given. Locales
    /// are handled one after another; the first failure stops the rest and is
    /// returned, leaving already written locales in place.
    pub fn assign(
        &self,
        ctx: &mut LocaleContext,
        record: RecordId,
        explicit_text: Option<&str>,
    ) -> SlugResult<Vec<Assignment>> {
        self.ensure_record(record)?;

        let mut assigned = Vec::new();
        for locale in locales_to_process(self.store.as_ref(), record, ctx)? {
            let outcome =
                ctx.with_locale(&locale, |ctx| self.assign_current(ctx, record, explicit_text))?;
            if let Some(assignment) = outcome {
                assigned.push(assignment);
            }
        }
        Ok(assigned)
    }

    /// Assigns a slug built from `text` for a single locale, the current one
    /// unless `locale` is given. Does nothing if that locale already has one.
    pub fn set_slug_for(
        &self,
        ctx: &mut LocaleContext,
        record: RecordId,
        text: &str,
        locale: Option<&Locale>,
    ) -> SlugResult<Option<Assignment>> {
        self.ensure_record(record)?;

        let locale = locale.cloned().unwrap_or_else(|| ctx.current().clone());
        ctx.with_locale(&locale, |ctx| self.assign_current(ctx, record, Some(text)))
    }

    /// True when `record` has no slug yet in `locale`.
    pub fn should_generate(&self, record: RecordId, locale: &Locale) -> SlugResult<bool> {
        let slug = self.store.get(record, locale, self.model.slug_field())?;
        Ok(slug.map_or(true, |s| s.is_empty()))
    }

    /// Replaces the slug of `record` in the current locale with one built
    /// from `text`, keeping the old value reachable through the history log.
    pub fn rename(
        &self,
        ctx: &LocaleContext,
        record: RecordId,
        text: &str,
    ) -> SlugResult<Assignment> {
        self.ensure_record(record)?;

        let locale = ctx.current();
        let candidates = self.build_candidates(ctx, record, Some(text))?;
        let slug = self.obtain_slug(&candidates)?;

        let previous = self.store.get(record, locale, self.model.slug_field())?;
        if previous.as_deref() == Some(slug.as_str()) {
            return Ok(Assignment {
                locale: locale.clone(),
                slug,
            });
        }
        // Slugs written before history was switched on are not logged yet.
        if let (Some(history), Some(previous)) = (&self.history, previous.as_deref()) {
            let logged = history.contains(self.model.name(), previous, Some(locale))?;
            if !previous.is_empty() && logged != Some(record) {
                history.append(record, previous, Some(locale))?;
            }
        }

        self.write_slug(record, locale, &slug)?;
        tracing::info!("Renamed {} {} ({}) to '{}'", self.model.name(), record, locale, slug);

        Ok(Assignment {
            locale: locale.clone(),
            slug,
        })
    }

    fn assign_current(
        &self,
        ctx: &LocaleContext,
        record: RecordId,
        explicit_text: Option<&str>,
    ) -> SlugResult<Option<Assignment>> {
        let locale = ctx.current();
        if !self.should_generate(record, locale)? {
            tracing::debug!("{} {} already has a slug for {}", self.model.name(), record, locale);
            return Ok(None);
        }

        let candidates = self.build_candidates(ctx, record, explicit_text)?;
        let slug = self.obtain_slug(&candidates)?;
        self.write_slug(record, locale, &slug)?;
        tracing::debug!("Assigned '{}' to {} {} ({})", slug, self.model.name(), record, locale);

        Ok(Some(Assignment {
            locale: locale.clone(),
            slug,
        }))
    }

    fn build_candidates(
        &self,
        ctx: &LocaleContext,
        record: RecordId,
        explicit_text: Option<&str>,
    ) -> SlugResult<Candidates> {
        let locale = ctx.current();
        let base = match explicit_text {
            Some(text) => text.to_string(),
            None => self
                .store
                .get(record, locale, self.model.base_field())?
                .unwrap_or_default(),
        };
        let normalized = self.normalizer.normalize(&base);
        Ok(Candidates::new(
            record,
            self.model.name(),
            locale.clone(),
            normalized,
        ))
    }

    fn obtain_slug(&self, candidates: &Candidates) -> SlugResult<String> {
        match self.generator.generate(candidates)? {
            Some(slug) => Ok(slug),
            None => self.resolver.resolve(candidates),
        }
    }

    fn write_slug(&self, record: RecordId, locale: &Locale, slug: &str) -> SlugResult<()> {
        self.store.set(record, locale, self.model.slug_field(), slug)?;
        if let Some(history) = &self.history {
            history.append(record, slug, Some(locale))?;
        }
        Ok(())
    }

    fn ensure_record(&self, record: RecordId) -> SlugResult<()> {
        match self.store.record_model(record)? {
            Some(model) if model == self.model.name() => Ok(()),
            _ => Err(SlugError::RecordNotFound(record.0)),
        }
    }
}
