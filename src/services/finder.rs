//! Slug lookups at query time. Nothing here writes.

use crate::config::UniquenessScope;
use crate::error::SlugResult;
use crate::models::{Feature, ModelConfig, RecordId};
use crate::services::locale::LocaleContext;
use crate::services::registry::RegisteredModel;
use crate::services::store::{HistoryStore, SlugIndex};
use serde::Serialize;
use std::sync::Arc;

/// How a model resolves slugs, fixed when it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinderStrategy {
    /// Current slugs in any locale.
    Basic,
    /// Current slugs in any locale, then slugs from the history log.
    HistoryAware,
    /// Current slugs in the current locale only.
    MobilityAware,
}

impl FinderStrategy {
    pub fn for_model(config: &ModelConfig) -> Self {
        if config.uses(Feature::History) {
            Self::HistoryAware
        } else if config.locale_scoped_lookup {
            Self::MobilityAware
        } else {
            Self::Basic
        }
    }
}

pub struct Finder {
    model: String,
    slug_field: String,
    strategy: FinderStrategy,
    index: Arc<dyn SlugIndex>,
    history: Option<Arc<dyn HistoryStore>>,
    scope: UniquenessScope,
}

impl Finder {
    pub fn new(model: &RegisteredModel, index: Arc<dyn SlugIndex>) -> Self {
        Self {
            model: model.name().to_string(),
            slug_field: model.slug_field().to_string(),
            strategy: model.finder_strategy(),
            index,
            history: None,
            scope: UniquenessScope::Global,
        }
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    /// With [`UniquenessScope::PerLocale`] the same slug may belong to
    /// different records in different locales, so every lookup is narrowed
    /// to the current locale.
    pub fn with_scope(mut self, scope: UniquenessScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn strategy(&self) -> FinderStrategy {
        self.strategy
    }

    /// Whether any record holds `id` now or, for history-aware models, held
    /// it in the past.
    pub fn exists_by_slug(&self, ctx: &LocaleContext, id: &str) -> SlugResult<bool> {
        if self.direct_match(ctx, id)?.is_some() {
            return Ok(true);
        }
        Ok(self.historical_match(ctx, id)?.is_some())
    }

    /// The record `id` points to. Current slugs win over historical ones.
    pub fn find_by_slug(&self, ctx: &LocaleContext, id: &str) -> SlugResult<Option<RecordId>> {
        if let Some(record) = self.direct_match(ctx, id)? {
            return Ok(Some(record));
        }
        self.historical_match(ctx, id)
    }

    fn direct_match(&self, ctx: &LocaleContext, id: &str) -> SlugResult<Option<RecordId>> {
        let locale = match (self.strategy, self.scope) {
            (FinderStrategy::MobilityAware, _) | (_, UniquenessScope::PerLocale) => {
                Some(ctx.current())
            }
            _ => None,
        };
        let owners = self
            .index
            .slug_owners(&self.model, &self.slug_field, id, locale)?;
        Ok(owners.into_iter().next())
    }

    fn historical_match(&self, ctx: &LocaleContext, id: &str) -> SlugResult<Option<RecordId>> {
        let locale = match self.scope {
            UniquenessScope::Global => None,
            UniquenessScope::PerLocale => Some(ctx.current()),
        };
        match (self.strategy, &self.history) {
            (FinderStrategy::HistoryAware, Some(history)) => {
                Ok(history.contains(&self.model, id, locale)?)
            }
            _ => Ok(None),
        }
    }
}
