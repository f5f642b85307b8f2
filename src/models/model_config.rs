use serde::{Deserialize, Serialize};

/// Optional behaviours a model can switch on next to per-locale slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Slugged,
    History,
    /// Plain finder add-on. It resolves slugs against a single column and
    /// cannot see translated slugs.
    Finders,
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slugged => write!(f, "slugged"),
            Self::History => write!(f, "history"),
            Self::Finders => write!(f, "finders"),
        }
    }
}

/// How a model declares itself to the slug machinery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    /// Whether the model stores translated fields per locale at all.
    #[serde(default)]
    pub translates: bool,
    #[serde(default)]
    pub translated_fields: Vec<String>,
    /// Field holding the human-readable text slugs are built from.
    #[serde(default = "default_base_field")]
    pub base_field: String,
    #[serde(default = "default_slug_field")]
    pub slug_field: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Restrict direct slug lookups to the current locale.
    #[serde(default = "default_true")]
    pub locale_scoped_lookup: bool,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translates: false,
            translated_fields: Vec::new(),
            base_field: default_base_field(),
            slug_field: default_slug_field(),
            features: Vec::new(),
            locale_scoped_lookup: true,
        }
    }

    pub fn translates(mut self, fields: &[&str]) -> Self {
        self.translates = true;
        self.translated_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn base_field(mut self, field: impl Into<String>) -> Self {
        self.base_field = field.into();
        self
    }

    pub fn slug_field(mut self, field: impl Into<String>) -> Self {
        self.slug_field = field.into();
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        if !self.uses(feature) {
            self.features.push(feature);
        }
        self
    }

    pub fn locale_scoped_lookup(mut self, scoped: bool) -> Self {
        self.locale_scoped_lookup = scoped;
        self
    }

    pub fn uses(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn is_translated(&self, field: &str) -> bool {
        self.translated_fields.iter().any(|f| f == field)
    }
}

fn default_base_field() -> String {
    "title".to_string()
}

fn default_slug_field() -> String {
    "slug".to_string()
}

fn default_true() -> bool {
    true
}
