//! libSQL backend — async `ActivityStore` implementation.
//!
//! Supports local file and in-memory databases; the schema is created on
//! open. Dates are stored as ISO-8601 strings (`YYYY-MM-DD`), which sort
//! correctly as text.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use libsql::{Connection, Database, params};
use tracing::info;

use crate::error::StoreError;
use crate::store::{Activity, ActivityStore, NewActivity};

const CREATE_ACTIVITIES_SQL: &str = "CREATE TABLE IF NOT EXISTS activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    end_date TEXT NOT NULL,
    location TEXT NOT NULL,
    description TEXT NOT NULL,
    image_url TEXT,
    activity_link TEXT
)";

const CREATE_END_DATE_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_activities_end_date ON activities(end_date)";

const ACTIVITY_COLUMNS: &str = "id, name, end_date, location, description, image_url, activity_link";

/// libSQL database backend.
///
/// Holds a single connection reused for all operations;
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<Database>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Activity database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute(CREATE_ACTIVITIES_SQL, ())
            .await
            .map_err(|e| StoreError::Query(format!("Failed to create activities table: {e}")))?;
        self.conn
            .execute(CREATE_END_DATE_INDEX_SQL, ())
            .await
            .map_err(|e| StoreError::Query(format!("Failed to create end_date index: {e}")))?;
        Ok(())
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Escape LIKE wildcards so user text matches literally.
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Map a libsql Row to an Activity. Column order matches ACTIVITY_COLUMNS.
fn row_to_activity(row: &libsql::Row) -> Result<Activity, StoreError> {
    let id: i64 = row
        .get(0)
        .map_err(|e| StoreError::Query(format!("Bad id column: {e}")))?;
    let name: String = row
        .get(1)
        .map_err(|e| StoreError::Query(format!("Bad name column: {e}")))?;
    let end_date_str: String = row
        .get(2)
        .map_err(|e| StoreError::Query(format!("Bad end_date column: {e}")))?;
    let location: String = row
        .get(3)
        .map_err(|e| StoreError::Query(format!("Bad location column: {e}")))?;
    let description: String = row
        .get(4)
        .map_err(|e| StoreError::Query(format!("Bad description column: {e}")))?;
    let image_url: Option<String> = row.get(5).ok();
    let activity_link: Option<String> = row.get(6).ok();

    let end_date = NaiveDate::parse_from_str(&end_date_str, "%Y-%m-%d")
        .map_err(|e| StoreError::Query(format!("Bad end_date value {end_date_str:?}: {e}")))?;

    Ok(Activity {
        id,
        name,
        end_date,
        location,
        description,
        image_url,
        activity_link,
    })
}

#[async_trait]
impl ActivityStore for LibSqlBackend {
    async fn find_by_name(&self, query: &str) -> Result<Option<Activity>, StoreError> {
        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities \
             WHERE lower(name) LIKE lower(?1) ESCAPE '\\' \
             ORDER BY id LIMIT 1"
        );

        let mut rows = self
            .conn
            .query(&sql, params![pattern])
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        match rows
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            Some(row) => Ok(Some(row_to_activity(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_upcoming(&self, limit: usize) -> Result<Vec<Activity>, StoreError> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities \
             ORDER BY end_date ASC, id ASC LIMIT ?1"
        );

        let mut rows = self
            .conn
            .query(&sql, params![limit as i64])
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut activities = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            activities.push(row_to_activity(&row)?);
        }
        Ok(activities)
    }

    async fn insert(&self, activity: NewActivity) -> Result<i64, StoreError> {
        self.conn
            .execute(
                "INSERT INTO activities (name, end_date, location, description, image_url, activity_link) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    activity.name,
                    activity.end_date.to_string(),
                    activity.location,
                    activity.description,
                    activity.image_url,
                    activity.activity_link
                ],
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }
}

// ── Tests ───────────────────────────────────────────────────────────
