use thiserror::Error;

pub type SlugResult<T> = Result<T, SlugError>;

#[derive(Debug, Error)]
pub enum SlugError {
    /// The model does not store any fields per locale.
    #[error("model '{model}' is not translated; declare `translates = true` with its translated fields")]
    NotTranslated { model: String },

    /// A field the slug machinery reads or writes per locale is not translated.
    #[error("you need to translate the '{field}' field of model '{model}' (add it to `translated_fields`)")]
    Configuration { model: String, field: String },

    #[error("model '{0}' is not registered")]
    UnknownModel(String),

    #[error("could not find a free slug for '{base}' after {attempts} attempts")]
    ConflictResolution { base: String, attempts: u32 },

    #[error("record {0} does not exist")]
    RecordNotFound(i64),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl SlugError {
    pub fn configuration(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Configuration {
            model: model.into(),
            field: field.into(),
        }
    }

    /// True for errors raised while registering a model.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NotTranslated { .. } | Self::Configuration { .. }
        )
    }
}
