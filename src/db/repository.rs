use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::RefreshRecord;

use super::schema::SCHEMA;

const KEYWORDS_KEY: &str = "keywords";
const FILTER_VISIBLE_KEY: &str = "filter_visible";

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            // The periodic trigger and the UI may share the file
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Preferences

    /// Raw keyword text as the user typed it, one keyword per line.
    pub async fn get_keywords(&self) -> Result<String> {
        Ok(self.get_preference(KEYWORDS_KEY).await?.unwrap_or_default())
    }

    pub async fn set_keywords(&self, text: &str) -> Result<()> {
        self.set_preference(KEYWORDS_KEY, text.to_string()).await
    }

    pub async fn get_filter_visible(&self) -> Result<bool> {
        Ok(self
            .get_preference(FILTER_VISIBLE_KEY)
            .await?
            .is_some_and(|v| v == "1"))
    }

    pub async fn set_filter_visible(&self, visible: bool) -> Result<()> {
        let value = if visible { "1" } else { "0" };
        self.set_preference(FILTER_VISIBLE_KEY, value.to_string())
            .await
    }

    async fn get_preference(&self, key: &'static str) -> Result<Option<String>> {
        let value = self
            .conn
            .call(move |conn| {
                let value: Option<String> = conn
                    .query_row(
                        "SELECT value FROM preferences WHERE key = ?1",
                        params![key],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await?;
        Ok(value)
    }

    async fn set_preference(&self, key: &'static str, value: String) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO preferences (key, value) VALUES (?1, ?2)
                       ON CONFLICT(key) DO UPDATE SET
                           value = excluded.value,
                           updated_at = datetime('now')"#,
                    params![key, value],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    // Refresh telemetry

    pub async fn record_refresh(&self, record: RefreshRecord) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO refresh_status (id, last_update, items_count)
                       VALUES (1, ?1, ?2)
                       ON CONFLICT(id) DO UPDATE SET
                           last_update = excluded.last_update,
                           items_count = excluded.items_count"#,
                    params![record.last_update.to_rfc3339(), record.items_count as i64],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn last_refresh(&self) -> Result<Option<RefreshRecord>> {
        let record = self
            .conn
            .call(|conn| {
                let record = conn
                    .query_row(
                        "SELECT last_update, items_count FROM refresh_status WHERE id = 1",
                        [],
                        refresh_from_row,
                    )
                    .optional()?;
                Ok(record)
            })
            .await?;
        Ok(record)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn refresh_from_row(row: &Row) -> rusqlite::Result<RefreshRecord> {
    Ok(RefreshRecord {
        last_update: row
            .get::<_, String>(0)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
        items_count: row.get::<_, i64>(1)?.max(0) as usize,
    })
}
