//! SQLite implementation of the storage seams.

use crate::models::{Locale, Record, RecordId, SlugHistoryEntry, Translation};
use crate::services::store::{HistoryStore, SlugIndex, TranslationStore};
use crate::Database;
use anyhow::Result;
use rusqlite::OptionalExtension;
use std::collections::BTreeMap;

#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn create_record(&self, model: &str) -> Result<RecordId> {
        let conn = self.db.get()?;
        conn.execute("INSERT INTO records (model) VALUES (?)", [model])?;
        Ok(RecordId(conn.last_insert_rowid()))
    }

    pub fn get_record(&self, id: RecordId) -> Result<Option<Record>> {
        let conn = self.db.get()?;
        let record = conn
            .query_row(
                "SELECT id, model, created_at FROM records WHERE id = ?",
                [id.0],
                |row| {
                    Ok(Record {
                        id: RecordId(row.get(0)?),
                        model: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn list_records(&self, model: &str) -> Result<Vec<Record>> {
        let conn = self.db.get()?;
        let mut stmt =
            conn.prepare("SELECT id, model, created_at FROM records WHERE model = ? ORDER BY id")?;
        let records = stmt
            .query_map([model], |row| {
                Ok(Record {
                    id: RecordId(row.get(0)?),
                    model: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Writes several fields of one translation in a single transaction.
    pub fn put_translation(
        &self,
        record: RecordId,
        locale: &Locale,
        fields: &[(&str, &str)],
    ) -> Result<()> {
        let mut conn = self.db.get()?;
        let tx = conn.transaction()?;
        let translation_id = ensure_translation(&tx, record, locale)?;
        for (field, value) in fields {
            upsert_value(&tx, translation_id, field, value)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_translation(&self, record: RecordId, locale: &Locale) -> Result<Option<Translation>> {
        let conn = self.db.get()?;
        let translation_id: Option<i64> = conn
            .query_row(
                "SELECT id FROM translations WHERE record_id = ?1 AND locale = ?2",
                rusqlite::params![record.0, locale.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(translation_id) = translation_id else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT field, value FROM translation_values WHERE translation_id = ? AND value IS NOT NULL",
        )?;
        let fields = stmt
            .query_map([translation_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Some(Translation {
            record_id: record,
            locale: locale.clone(),
            fields,
        }))
    }
}

fn ensure_translation(conn: &rusqlite::Connection, record: RecordId, locale: &Locale) -> Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO translations (record_id, locale) VALUES (?1, ?2)",
        rusqlite::params![record.0, locale.as_str()],
    )?;
    let id = conn.query_row(
        "SELECT id FROM translations WHERE record_id = ?1 AND locale = ?2",
        rusqlite::params![record.0, locale.as_str()],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn upsert_value(conn: &rusqlite::Connection, translation_id: i64, field: &str, value: &str) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO translation_values (translation_id, field, value)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(translation_id, field)
        DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
        rusqlite::params![translation_id, field, value],
    )?;
    Ok(())
}

impl TranslationStore for SqliteStore {
    fn record_model(&self, record: RecordId) -> Result<Option<String>> {
        let conn = self.db.get()?;
        let model = conn
            .query_row("SELECT model FROM records WHERE id = ?", [record.0], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(model)
    }

    fn get(&self, record: RecordId, locale: &Locale, field: &str) -> Result<Option<String>> {
        let conn = self.db.get()?;
        let value: Option<Option<String>> = conn
            .query_row(
                r#"
                SELECT v.value
                FROM translation_values v
                JOIN translations t ON t.id = v.translation_id
                WHERE t.record_id = ?1 AND t.locale = ?2 AND v.field = ?3
                "#,
                rusqlite::params![record.0, locale.as_str(), field],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    fn set(&self, record: RecordId, locale: &Locale, field: &str, value: &str) -> Result<()> {
        self.put_translation(record, locale, &[(field, value)])
    }

    fn list_locales(&self, record: RecordId) -> Result<Vec<Locale>> {
        let conn = self.db.get()?;
        let mut stmt =
            conn.prepare("SELECT locale FROM translations WHERE record_id = ? ORDER BY id")?;
        let locales = stmt
            .query_map([record.0], |row| row.get::<_, String>(0))?
            .map(|r| r.map(Locale::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(locales)
    }
}

impl SlugIndex for SqliteStore {
    fn slug_owners(
        &self,
        model: &str,
        slug_field: &str,
        slug: &str,
        locale: Option<&Locale>,
    ) -> Result<Vec<RecordId>> {
        let conn = self.db.get()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT t.record_id
            FROM translation_values v
            JOIN translations t ON t.id = v.translation_id
            JOIN records r ON r.id = t.record_id
            WHERE r.model = ?1
              AND v.field = ?2
              AND v.value = ?3
              AND (?4 IS NULL OR t.locale = ?4)
            ORDER BY t.record_id
            "#,
        )?;
        let owners = stmt
            .query_map(
                rusqlite::params![model, slug_field, slug, locale.map(|l| l.as_str())],
                |row| row.get::<_, i64>(0),
            )?
            .map(|r| r.map(RecordId))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(owners)
    }
}

impl HistoryStore for SqliteStore {
    fn append(&self, record: RecordId, slug: &str, locale: Option<&Locale>) -> Result<()> {
        let conn = self.db.get()?;
        conn.execute(
            "INSERT INTO slug_history (record_id, slug, locale, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                record.0,
                slug,
                locale.map(|l| l.as_str()),
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        tracing::debug!("Logged slug '{}' for record {}", slug, record);
        Ok(())
    }

    fn contains(
        &self,
        model: &str,
        slug: &str,
        locale: Option<&Locale>,
    ) -> Result<Option<RecordId>> {
        let conn = self.db.get()?;
        let owner = conn
            .query_row(
                r#"
                SELECT h.record_id
                FROM slug_history h
                JOIN records r ON r.id = h.record_id
                WHERE r.model = ?1
                  AND h.slug = ?2
                  AND (?3 IS NULL OR h.locale IS NULL OR h.locale = ?3)
                ORDER BY h.id DESC
                LIMIT 1
                "#,
                rusqlite::params![model, slug, locale.map(|l| l.as_str())],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(owner.map(RecordId))
    }

    fn list(&self, record: RecordId) -> Result<Vec<SlugHistoryEntry>> {
        let conn = self.db.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, record_id, slug, locale, created_at FROM slug_history WHERE record_id = ? ORDER BY id",
        )?;
        let entries = stmt
            .query_map([record.0], |row| {
                Ok(SlugHistoryEntry {
                    id: row.get(0)?,
                    record_id: RecordId(row.get(1)?),
                    slug: row.get(2)?,
                    locale: row.get::<_, Option<String>>(3)?.map(Locale::from),
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
