// Persistence traits; sqlite implementation in `sqlite`

mod sqlite;

pub use sqlite::SqliteStore;

use crate::domain::models::{Chapter, Track};

#[async_trait::async_trait]
pub trait ChapterRepo: Send + Sync {
    /// Chapters of one series, ascending by number.
    async fn list_for_series(&self, series_id: i32) -> anyhow::Result<Vec<Chapter>>;
    /// Persist `read = true` for the given chapters. Re-applying is a no-op.
    async fn mark_read(&self, chapters: &[Chapter]) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
pub trait TrackRepo: Send + Sync {
    async fn get(&self, series_id: i32, tracker_id: i32) -> anyhow::Result<Option<Track>>;
    async fn insert_or_update(&self, track: &Track) -> anyhow::Result<()>;
}
