use super::Locale;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub id: RecordId,
    pub model: String,
    pub created_at: String,
}

/// All translated values of one record in one locale.
#[derive(Debug, Clone, Serialize)]
pub struct Translation {
    pub record_id: RecordId,
    pub locale: Locale,
    pub fields: BTreeMap<String, String>,
}

impl Translation {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.as_str())
    }
}

/// Result of one locale's slug assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub locale: Locale,
    pub slug: String,
}
