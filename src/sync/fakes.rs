//! In-memory collaborators for exercising sync without a tracker or database.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use super::ChapterTrackSync;
use crate::{
    domain::models::{Chapter, Track},
    storage::{ChapterRepo, TrackRepo},
    tracker_client::TrackerService,
};

pub(crate) type CallLog = Arc<Mutex<Vec<&'static str>>>;

pub(crate) struct FakeTracker {
    pub(crate) remote: Mutex<f64>,
    pub(crate) fail_fetch: bool,
    pub(crate) fail_update: bool,
    pub(crate) log: CallLog,
}

#[async_trait::async_trait]
impl TrackerService for FakeTracker {
    async fn fetch(&self, track: &Track) -> anyhow::Result<Track> {
        self.log.lock().unwrap().push("fetch");
        tokio::task::yield_now().await;
        if self.fail_fetch {
            anyhow::bail!("tracker unreachable");
        }
        Ok(Track {
            last_chapter_read: *self.remote.lock().unwrap(),
            ..track.clone()
        })
    }

    async fn update(&self, track: &Track) -> anyhow::Result<()> {
        self.log.lock().unwrap().push("update");
        tokio::task::yield_now().await;
        if self.fail_update {
            anyhow::bail!("tracker rejected update");
        }
        *self.remote.lock().unwrap() = track.last_chapter_read;
        Ok(())
    }
}

pub(crate) struct FakeChapters {
    pub(crate) chapters: Mutex<Vec<Chapter>>,
    pub(crate) fail: bool,
    pub(crate) fail_list: AtomicBool,
    pub(crate) log: CallLog,
}

#[async_trait::async_trait]
impl ChapterRepo for FakeChapters {
    async fn list_for_series(&self, series_id: i32) -> anyhow::Result<Vec<Chapter>> {
        if self.fail_list.load(Ordering::SeqCst) {
            anyhow::bail!("database locked");
        }
        let chapters = self.chapters.lock().unwrap();
        Ok(chapters
            .iter()
            .filter(|c| c.series_id == series_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, updates: &[Chapter]) -> anyhow::Result<()> {
        self.log.lock().unwrap().push("mark_read");
        tokio::task::yield_now().await;
        if self.fail {
            anyhow::bail!("disk full");
        }
        let mut chapters = self.chapters.lock().unwrap();
        for c in chapters.iter_mut() {
            if updates.iter().any(|u| u.id == c.id && u.read) {
                c.read = true;
            }
        }
        Ok(())
    }
}

pub(crate) struct FakeTracks {
    pub(crate) track: Mutex<Option<Track>>,
    pub(crate) log: CallLog,
}

#[async_trait::async_trait]
impl TrackRepo for FakeTracks {
    async fn get(&self, series_id: i32, tracker_id: i32) -> anyhow::Result<Option<Track>> {
        Ok(self
            .track
            .lock()
            .unwrap()
            .clone()
            .filter(|t| t.series_id == series_id && t.tracker_id == tracker_id))
    }

    async fn insert_or_update(&self, track: &Track) -> anyhow::Result<()> {
        self.log.lock().unwrap().push("insert_or_update");
        *self.track.lock().unwrap() = Some(track.clone());
        Ok(())
    }
}

pub(crate) struct Fixture {
    pub(crate) sync: Arc<ChapterTrackSync>,
    pub(crate) tracker: Arc<FakeTracker>,
    pub(crate) chapters: Arc<FakeChapters>,
    pub(crate) tracks: Arc<FakeTracks>,
    pub(crate) log: CallLog,
}

pub(crate) fn fixture(
    remote: f64,
    chapters: &[(f64, bool)],
    fail_fetch: bool,
    fail_update: bool,
    fail_chapters: bool,
) -> Fixture {
    let log: CallLog = Arc::default();
    let tracker = Arc::new(FakeTracker {
        remote: Mutex::new(remote),
        fail_fetch,
        fail_update,
        log: log.clone(),
    });
    let chapters = Arc::new(FakeChapters {
        chapters: Mutex::new(
            chapters
                .iter()
                .enumerate()
                .map(|(i, &(number, read))| Chapter {
                    id: i as i32 + 1,
                    series_id: 1,
                    name: format!("Chapter {number}"),
                    number,
                    read,
                })
                .collect(),
        ),
        fail: fail_chapters,
        fail_list: AtomicBool::new(false),
        log: log.clone(),
    });
    let tracks = Arc::new(FakeTracks {
        track: Mutex::new(Some(Track {
            id: 1,
            series_id: 1,
            tracker_id: 3,
            remote_id: 500,
            title: "Series".into(),
            last_chapter_read: 0.0,
            total_chapters: 0,
            last_synced_at: None,
        })),
        log: log.clone(),
    });
    let sync = Arc::new(ChapterTrackSync::new(
        tracker.clone(),
        chapters.clone(),
        tracks.clone(),
    ));
    Fixture {
        sync,
        tracker,
        chapters,
        tracks,
        log,
    }
}

pub(crate) fn calls(log: &CallLog) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}
