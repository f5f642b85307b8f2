use crate::config::{Config, SlugsConfig};
use crate::error::SlugResult;
use crate::models::Locale;
use crate::services::assigner::SlugAssigner;
use crate::services::finder::Finder;
use crate::services::generator::{resolver_from_config, SlugAvailability, StoreBackedGenerator};
use crate::services::locale::LocaleContext;
use crate::services::normalize::{DefaultNormalizer, Normalizer};
use crate::services::registry::{ModelRegistry, RegisteredModel};
use crate::services::sqlite_store::SqliteStore;
use crate::services::store::{HistoryStore, SlugIndex, TranslationStore};
use crate::Database;
use std::sync::Arc;

/// Wires registered models to the SQLite store and the configured policies.
pub struct SlugEngine {
    registry: ModelRegistry,
    store: Arc<SqliteStore>,
    normalizer: Arc<dyn Normalizer>,
    slugs: SlugsConfig,
    default_locale: Locale,
}

impl SlugEngine {
    /// Registers every configured model. Fails on the first misconfigured one.
    pub fn new(config: &Config, db: Database) -> SlugResult<Self> {
        let registry = ModelRegistry::from_configs(&config.models)?;
        Ok(Self::with_registry(
            registry,
            config.slugs.clone(),
            Locale::new(config.locale.default.clone()),
            db,
        ))
    }

    pub fn with_registry(
        registry: ModelRegistry,
        slugs: SlugsConfig,
        default_locale: Locale,
        db: Database,
    ) -> Self {
        Self {
            registry,
            store: Arc::new(SqliteStore::new(db)),
            normalizer: Arc::new(DefaultNormalizer::from_config(&slugs)),
            slugs,
            default_locale,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// A context starting in the configured default locale.
    pub fn context(&self) -> LocaleContext {
        LocaleContext::new(self.default_locale.clone())
    }

    pub fn assigner(&self, model: &str) -> SlugResult<SlugAssigner> {
        let model = self.registry.get(model)?;
        let availability = self.availability(model);
        let store: Arc<dyn TranslationStore> = self.store.clone();

        let assigner = SlugAssigner::new(
            model.clone(),
            store,
            Arc::clone(&self.normalizer),
            Arc::new(StoreBackedGenerator::new(Arc::clone(&availability))),
            resolver_from_config(&self.slugs, availability),
        );

        if model.uses_history() {
            let history: Arc<dyn HistoryStore> = self.store.clone();
            Ok(assigner.with_history(history))
        } else {
            Ok(assigner)
        }
    }

    pub fn finder(&self, model: &str) -> SlugResult<Finder> {
        let model = self.registry.get(model)?;
        let index: Arc<dyn SlugIndex> = self.store.clone();
        let finder = Finder::new(model, index).with_scope(self.slugs.uniqueness);

        if model.uses_history() {
            let history: Arc<dyn HistoryStore> = self.store.clone();
            Ok(finder.with_history(history))
        } else {
            Ok(finder)
        }
    }

    fn availability(&self, model: &RegisteredModel) -> Arc<SlugAvailability> {
        let index: Arc<dyn SlugIndex> = self.store.clone();
        let availability =
            SlugAvailability::new(index, model.slug_field(), self.slugs.uniqueness)
                .with_reserved(self.slugs.reserved.clone());

        if model.uses_history() {
            let history: Arc<dyn HistoryStore> = self.store.clone();
            Arc::new(availability.with_history(history))
        } else {
            Arc::new(availability)
        }
    }
}
