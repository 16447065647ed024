use std::sync::Arc;

use poem_openapi::payload::Json;

use crate::{
    api::models::{
        ChapterListResponseDto, ErrorDto, SyncResponseDto, SyncResultDto, TrackResponseDto,
    },
    domain::models::MarkReadPolicy,
    sync::{ChapterTrackSync, SyncError},
};

pub struct ProgressService<'a> {
    pub sync: &'a Arc<ChapterTrackSync>,
}

impl<'a> ProgressService<'a> {
    pub fn new(sync: &'a Arc<ChapterTrackSync>) -> Self {
        Self { sync }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list_chapters(&self, series_id: i32) -> ChapterListResponseDto {
        match self.sync.chapters().list_for_series(series_id).await {
            Ok(chapters) => {
                ChapterListResponseDto::Ok(Json(chapters.into_iter().map(Into::into).collect()))
            }
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), series_id, "failed to list chapters");
                ChapterListResponseDto::InternalError(Json(ErrorDto::from(e.to_string())))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_track(&self, series_id: i32, tracker_id: i32) -> TrackResponseDto {
        match self.sync.tracks().get(series_id, tracker_id).await {
            Ok(Some(track)) => TrackResponseDto::Ok(Json(track.into())),
            Ok(None) => TrackResponseDto::NotFound(Json(ErrorDto {
                message: format!("series {} is not tracked on tracker {}", series_id, tracker_id),
            })),
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), series_id, tracker_id, "failed to load track");
                TrackResponseDto::InternalError(Json(ErrorDto::from(e.to_string())))
            }
        }
    }

    /// Reconcile and answer as soon as the outcome is known. The publish step
    /// keeps running detached and logs its own failures.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn sync(
        &self,
        series_id: i32,
        tracker_id: i32,
        policy: MarkReadPolicy,
    ) -> SyncResponseDto {
        match self.sync.sync_series(series_id, tracker_id, policy).await {
            Ok(handle) => SyncResponseDto::Accepted(Json(SyncResultDto::from(
                &handle.reconciliation,
            ))),
            Err(e @ SyncError::NotTracked { .. }) => {
                SyncResponseDto::NotFound(Json(ErrorDto::from(e.to_string())))
            }
            Err(e) => {
                tracing::error!(error = %e, effect = e.is_effect(), series_id, tracker_id, "failed to sync series");
                SyncResponseDto::BadGateway(Json(ErrorDto::from(e.to_string())))
            }
        }
    }
}
