use std::sync::Arc;

use anyhow::Context;
use entities::{chapter, track};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::{Expr, OnConflict},
};

use super::{ChapterRepo, TrackRepo};
use crate::domain::{
    mapping::{map_chapter, map_track, track_to_active},
    models::{Chapter, Track},
};

#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: Arc<DatabaseConnection>,
}

impl SqliteStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl ChapterRepo for SqliteStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_for_series(&self, series_id: i32) -> anyhow::Result<Vec<Chapter>> {
        let rows = chapter::Entity::find()
            .filter(chapter::Column::SeriesId.eq(series_id))
            .order_by_asc(chapter::Column::Number)
            .all(self.db.as_ref())
            .await
            .with_context(|| format!("Failed to load chapters for series {}", series_id))?;
        Ok(rows.into_iter().map(map_chapter).collect())
    }

    #[tracing::instrument(level = "debug", skip(self, chapters), fields(count = chapters.len()))]
    async fn mark_read(&self, chapters: &[Chapter]) -> anyhow::Result<()> {
        let ids: Vec<i32> = chapters.iter().filter(|c| c.read).map(|c| c.id).collect();
        if ids.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        let res = chapter::Entity::update_many()
            .col_expr(chapter::Column::Read, Expr::value(true))
            .filter(chapter::Column::Id.is_in(ids))
            .exec(&txn)
            .await
            .with_context(|| "Failed to mark chapters read")?;
        txn.commit().await?;
        tracing::debug!(rows = res.rows_affected, "chapters marked read");
        Ok(())
    }
}

#[async_trait::async_trait]
impl TrackRepo for SqliteStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, series_id: i32, tracker_id: i32) -> anyhow::Result<Option<Track>> {
        let row = track::Entity::find()
            .filter(track::Column::SeriesId.eq(series_id))
            .filter(track::Column::TrackerId.eq(tracker_id))
            .one(self.db.as_ref())
            .await
            .with_context(|| {
                format!(
                    "Failed to load track for series {} on tracker {}",
                    series_id, tracker_id
                )
            })?;
        Ok(row.map(map_track))
    }

    #[tracing::instrument(level = "debug", skip(self, track), fields(series_id = track.series_id, tracker_id = track.tracker_id))]
    async fn insert_or_update(&self, track: &Track) -> anyhow::Result<()> {
        track::Entity::insert(track_to_active(track))
            .on_conflict(
                OnConflict::columns([track::Column::SeriesId, track::Column::TrackerId])
                    .update_columns([
                        track::Column::RemoteId,
                        track::Column::Title,
                        track::Column::LastChapterRead,
                        track::Column::TotalChapters,
                        track::Column::LastSyncedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await
            .with_context(|| "Failed to upsert track")?;
        Ok(())
    }
}
