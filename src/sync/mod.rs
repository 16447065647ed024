//! Drives one reconciliation for a (series, tracker) pair: load local state,
//! refresh the remote watermark, reconcile inline, then publish the result in
//! a background task. The tracker is updated before local storage so a crash
//! in between leaves the local cache behind the tracker, never ahead of it.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::Utc;
use tokio::{
    sync::{Mutex as AsyncMutex, OwnedMutexGuard},
    task::JoinHandle,
};

#[cfg(test)]
pub(crate) mod fakes;

use crate::{
    domain::{
        models::{MarkReadPolicy, Track},
        reconcile::{Reconciliation, reconcile},
    },
    storage::{ChapterRepo, TrackRepo},
    tracker_client::TrackerService,
};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("series {series_id} is not tracked on tracker {tracker_id}")]
    NotTracked { series_id: i32, tracker_id: i32 },

    #[error("failed to load chapters: {0:#}")]
    LoadChapters(anyhow::Error),

    #[error("failed to load track: {0:#}")]
    LoadTrack(anyhow::Error),

    #[error("failed to fetch remote track: {0:#}")]
    FetchRemote(anyhow::Error),

    #[error("failed to update remote track: {0:#}")]
    RemoteUpdate(anyhow::Error),

    #[error("failed to persist chapters: {0:#}")]
    PersistChapters(anyhow::Error),

    #[error("failed to persist track: {0:#}")]
    PersistTrack(anyhow::Error),
}

impl SyncError {
    /// Failures while publishing an already computed reconciliation.
    pub fn is_effect(&self) -> bool {
        matches!(
            self,
            SyncError::RemoteUpdate(_) | SyncError::PersistChapters(_) | SyncError::PersistTrack(_)
        )
    }
}

/// Result of [`ChapterTrackSync::sync_series`]. `effects` resolves once the
/// tracker push and local persistence have run; failures are already logged.
pub struct SyncHandle {
    pub reconciliation: Reconciliation,
    pub effects: JoinHandle<Result<(), SyncError>>,
}

pub struct ChapterTrackSync {
    tracker: Arc<dyn TrackerService>,
    chapters: Arc<dyn ChapterRepo>,
    tracks: Arc<dyn TrackRepo>,
    series_locks: Mutex<HashMap<i32, Arc<AsyncMutex<()>>>>,
}

impl ChapterTrackSync {
    pub fn new(
        tracker: Arc<dyn TrackerService>,
        chapters: Arc<dyn ChapterRepo>,
        tracks: Arc<dyn TrackRepo>,
    ) -> Self {
        Self {
            tracker,
            chapters,
            tracks,
            series_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn tracks(&self) -> &dyn TrackRepo {
        self.tracks.as_ref()
    }

    pub fn chapters(&self) -> &dyn ChapterRepo {
        self.chapters.as_ref()
    }

    fn series_lock(&self, series_id: i32) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .series_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // entries nobody holds or waits on are idle
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(series_id).or_default().clone()
    }

    /// Reconcile one series with one tracker.
    ///
    /// Syncs of the same series are serialized: the per-series lock is held
    /// until the spawned effects finish, so the next sync reads the watermark
    /// this one published.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn sync_series(
        self: &Arc<Self>,
        series_id: i32,
        tracker_id: i32,
        policy: MarkReadPolicy,
    ) -> Result<SyncHandle, SyncError> {
        let guard = self.series_lock(series_id).lock_owned().await;

        let local_track = self
            .tracks
            .get(series_id, tracker_id)
            .await
            .map_err(SyncError::LoadTrack)?
            .ok_or(SyncError::NotTracked {
                series_id,
                tracker_id,
            })?;
        let chapters = self
            .chapters
            .list_for_series(series_id)
            .await
            .map_err(SyncError::LoadChapters)?;
        let remote = self
            .tracker
            .fetch(&local_track)
            .await
            .map_err(SyncError::FetchRemote)?;

        let reconciliation = reconcile(&chapters, &remote, policy);
        tracing::info!(
            series_id,
            tracker_id,
            marked = reconciliation.chapter_updates.len(),
            last_chapter_read = reconciliation.track.last_chapter_read,
            advances_remote = reconciliation.advances_remote(&remote),
            "reconciled series with tracker"
        );

        let effects = self.spawn_apply(reconciliation.clone(), guard);
        Ok(SyncHandle {
            reconciliation,
            effects,
        })
    }

    fn spawn_apply(
        self: &Arc<Self>,
        reconciliation: Reconciliation,
        guard: OwnedMutexGuard<()>,
    ) -> JoinHandle<Result<(), SyncError>> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            let result = this.apply(&reconciliation).await;
            if let Err(e) = &result {
                // best effort: the next sync catches up through the max merge
                tracing::warn!(
                    series_id = reconciliation.track.series_id,
                    tracker_id = reconciliation.track.tracker_id,
                    error = %e,
                    "track sync failed"
                );
            }
            result
        })
    }

    /// Publish a reconciliation: tracker first, then chapters, then the local
    /// track mirror. Stops at the first failure without undoing earlier steps.
    #[tracing::instrument(
        level = "debug",
        skip(self, reconciliation),
        fields(series_id = reconciliation.track.series_id, tracker_id = reconciliation.track.tracker_id)
    )]
    pub async fn apply(&self, reconciliation: &Reconciliation) -> Result<(), SyncError> {
        self.tracker
            .update(&reconciliation.track)
            .await
            .map_err(SyncError::RemoteUpdate)?;

        self.chapters
            .mark_read(&reconciliation.chapter_updates)
            .await
            .map_err(SyncError::PersistChapters)?;

        let mirror = Track {
            last_synced_at: Some(Utc::now()),
            ..reconciliation.track.clone()
        };
        self.tracks
            .insert_or_update(&mirror)
            .await
            .map_err(SyncError::PersistTrack)?;

        tracing::debug!("track sync published");
        Ok(())
    }
}
