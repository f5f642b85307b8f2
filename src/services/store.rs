//! Storage seams the slug machinery talks to.
//!
//! `SqliteStore` implements all of them; tests wrap or replace them freely.

use crate::models::{Locale, RecordId, SlugHistoryEntry};
use anyhow::Result;

/// Per-locale field storage of translated records.
pub trait TranslationStore: Send + Sync {
    /// Model name the record belongs to, or `None` if the record is unknown.
    fn record_model(&self, record: RecordId) -> Result<Option<String>>;

    fn get(&self, record: RecordId, locale: &Locale, field: &str) -> Result<Option<String>>;

    /// Writes one field, creating the translation for `locale` if needed.
    fn set(&self, record: RecordId, locale: &Locale, field: &str, value: &str) -> Result<()>;

    /// Locales the record has translations for, in storage order.
    fn list_locales(&self, record: RecordId) -> Result<Vec<Locale>>;
}

/// Lookup of current slugs.
pub trait SlugIndex: Send + Sync {
    /// Records of `model` whose `slug_field` equals `slug`, optionally only
    /// in translations for `locale`.
    fn slug_owners(
        &self,
        model: &str,
        slug_field: &str,
        slug: &str,
        locale: Option<&Locale>,
    ) -> Result<Vec<RecordId>>;
}

/// Append-only log of every slug a record has held.
pub trait HistoryStore: Send + Sync {
    fn append(&self, record: RecordId, slug: &str, locale: Option<&Locale>) -> Result<()>;

    /// Most recent record of `model` that held `slug`. With `locale`, only
    /// entries logged for that locale (or for no locale) count.
    fn contains(
        &self,
        model: &str,
        slug: &str,
        locale: Option<&Locale>,
    ) -> Result<Option<RecordId>>;

    fn list(&self, record: RecordId) -> Result<Vec<SlugHistoryEntry>>;
}
