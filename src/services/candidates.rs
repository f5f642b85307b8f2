use crate::models::{Locale, RecordId};

/// The proposed slug for one record in one locale, with the context needed
/// to check it.
///
/// Built fresh for every assignment attempt and handed to the generator and,
/// if needed, the conflict resolver.
#[derive(Debug, Clone)]
pub struct Candidates {
    record: RecordId,
    model: String,
    locale: Locale,
    base: String,
}

impl Candidates {
    pub fn new(
        record: RecordId,
        model: impl Into<String>,
        locale: Locale,
        base: impl Into<String>,
    ) -> Self {
        Self {
            record,
            model: model.into(),
            locale,
            base: base.into(),
        }
    }

    pub fn record(&self) -> RecordId {
        self.record
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// The normalized base text, possibly empty.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Candidates worth checking. An empty base yields none.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        Some(self.base.as_str()).filter(|s| !s.is_empty()).into_iter()
    }
}
