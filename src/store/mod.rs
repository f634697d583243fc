//! Activity persistence — model, store trait, libsql backend.

pub mod libsql_backend;

pub use libsql_backend::LibSqlBackend;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;

/// Number of rows returned by the upcoming-activities listing.
pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

/// A promotable event, as edited through the admin surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    /// Listings are ordered by this date, soonest-ending first.
    pub end_date: NaiveDate,
    pub location: String,
    pub description: String,
    /// Hero image; rendered with a placeholder when absent.
    pub image_url: Option<String>,
    /// Detail-page link; rendered with a fallback URI when absent.
    pub activity_link: Option<String>,
}

/// A new activity row, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub name: String,
    pub end_date: NaiveDate,
    pub location: String,
    pub description: String,
    pub image_url: Option<String>,
    pub activity_link: Option<String>,
}

/// Async interface over activity records.
///
/// The request path only reads. Writes happen through the external admin
/// surface (and test fixtures) via `insert`; there are no writers during
/// event handling, so concurrent readers need no coordination.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Case-insensitive substring match against the name field.
    ///
    /// Returns the first match in insertion order when several records
    /// match, or `None` when nothing does.
    async fn find_by_name(&self, query: &str) -> Result<Option<Activity>, StoreError>;

    /// All activities sorted ascending by end date, truncated to `limit`.
    /// An empty table yields an empty vec, not an error.
    async fn list_upcoming(&self, limit: usize) -> Result<Vec<Activity>, StoreError>;

    /// Insert a new activity, returning its assigned id.
    async fn insert(&self, activity: NewActivity) -> Result<i64, StoreError>;
}
