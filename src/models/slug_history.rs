use super::{Locale, RecordId};
use serde::Serialize;

/// A slug a record has held at some point. Rows are never updated.
#[derive(Debug, Clone, Serialize)]
pub struct SlugHistoryEntry {
    pub id: i64,
    pub record_id: RecordId,
    pub slug: String,
    pub locale: Option<Locale>,
    pub created_at: String,
}
