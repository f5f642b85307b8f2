//! Model registration.
//!
//! A model is checked once, when it is registered, so a misconfigured model
//! fails before any record of it is written.

use crate::error::{SlugError, SlugResult};
use crate::models::{Feature, ModelConfig};
use crate::services::finder::FinderStrategy;
use std::collections::HashMap;

/// A model that passed registration, with its finder strategy fixed.
#[derive(Debug, Clone)]
pub struct RegisteredModel {
    config: ModelConfig,
    finder: FinderStrategy,
}

impl RegisteredModel {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn finder_strategy(&self) -> FinderStrategy {
        self.finder
    }

    pub fn base_field(&self) -> &str {
        &self.config.base_field
    }

    pub fn slug_field(&self) -> &str {
        &self.config.slug_field
    }

    pub fn uses_history(&self) -> bool {
        self.config.uses(Feature::History)
    }
}

/// Validates `config` and picks its finder strategy.
pub fn register_model(config: ModelConfig) -> SlugResult<RegisteredModel> {
    ensure_translated(&config)?;

    let config = config.with_feature(Feature::Slugged);

    if config.uses(Feature::Finders) {
        tracing::warn!(
            model = %config.name,
            "The finders add-on is not compatible with per-locale slugs. \
             Please remove one or the other from the {} model.",
            config.name
        );
    }

    let finder = FinderStrategy::for_model(&config);
    tracing::debug!("Registered model {} with {:?} finder", config.name, finder);

    Ok(RegisteredModel { config, finder })
}

fn ensure_translated(config: &ModelConfig) -> SlugResult<()> {
    if !config.translates {
        return Err(SlugError::NotTranslated {
            model: config.name.clone(),
        });
    }
    for field in [&config.base_field, &config.slug_field] {
        if !config.is_translated(field) {
            return Err(SlugError::configuration(&config.name, field.as_str()));
        }
    }
    Ok(())
}

/// Registered models by name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, RegisteredModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every model, stopping at the first invalid one.
    pub fn from_configs<'a, I>(configs: I) -> SlugResult<Self>
    where
        I: IntoIterator<Item = &'a ModelConfig>,
    {
        let mut registry = Self::new();
        for config in configs {
            registry.register(config.clone())?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, config: ModelConfig) -> SlugResult<&RegisteredModel> {
        let model = register_model(config)?;
        let name = model.name().to_string();
        self.models.insert(name.clone(), model);
        self.get(&name)
    }

    pub fn get(&self, name: &str) -> SlugResult<&RegisteredModel> {
        self.models
            .get(name)
            .ok_or_else(|| SlugError::UnknownModel(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}
