use std::sync::Arc;

use poem_openapi::{
    OpenApi,
    param::{Path, Query},
};

use super::models::{
    ChapterListResponseDto, MarkReadPolicyDto, SyncResponseDto, TrackResponseDto,
    TrackerStatusResponseDto,
};
use super::services::{health::HealthService, progress::ProgressService};
use crate::{config::Config, sync::ChapterTrackSync, tracker_client::TrackerClient};

pub struct ProgressApi {
    pub client: Arc<TrackerClient>,
    pub sync: Arc<ChapterTrackSync>,
    pub config: Arc<Config>,
}

#[OpenApi]
impl ProgressApi {
    /// Tracker reachability
    #[oai(path = "/status", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn status(&self) -> TrackerStatusResponseDto {
        tracing::debug!("handling /status");
        HealthService::new(&self.client).tracker_status().await
    }

    /// Local chapters of a series
    #[oai(path = "/v1/series/:series_id/chapters", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, series_id))]
    async fn list_chapters(&self, series_id: Path<i32>) -> ChapterListResponseDto {
        ProgressService::new(&self.sync)
            .list_chapters(series_id.0)
            .await
    }

    /// Local mirror of the tracker record for a series
    #[oai(path = "/v1/series/:series_id/trackers/:tracker_id", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, series_id, tracker_id))]
    async fn get_track(&self, series_id: Path<i32>, tracker_id: Path<i32>) -> TrackResponseDto {
        ProgressService::new(&self.sync)
            .get_track(series_id.0, tracker_id.0)
            .await
    }

    /// Two-way sync of chapter read state with the tracker
    #[oai(path = "/v1/series/:series_id/trackers/:tracker_id/sync", method = "post")]
    #[tracing::instrument(level = "debug", skip(self, series_id, tracker_id, policy))]
    async fn sync(
        &self,
        series_id: Path<i32>,
        tracker_id: Path<i32>,
        /// Overrides the configured mark-read policy
        Query(policy): Query<Option<MarkReadPolicyDto>>,
    ) -> SyncResponseDto {
        let policy = policy
            .map(Into::into)
            .unwrap_or(self.config.mark_read_policy);
        tracing::debug!(series_id = series_id.0, tracker_id = tracker_id.0, ?policy, "handling sync");
        ProgressService::new(&self.sync)
            .sync(series_id.0, tracker_id.0, policy)
            .await
    }

    /// Sync a series with the configured default tracker
    #[oai(path = "/v1/series/:series_id/sync", method = "post")]
    #[tracing::instrument(level = "debug", skip(self, series_id))]
    async fn sync_default_tracker(&self, series_id: Path<i32>) -> SyncResponseDto {
        ProgressService::new(&self.sync)
            .sync(series_id.0, self.config.tracker_id, self.config.mark_read_policy)
            .await
    }
}
