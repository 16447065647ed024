//! Two-way merge of local per-chapter read state with a tracker's scalar
//! "last chapter read" watermark.
//!
//! Remote to local: unread chapters at or below the watermark are marked read,
//! subject to [`MarkReadPolicy`]. Local to remote: the watermark is raised to
//! the end of the contiguous run of read chapters starting at the lowest
//! numbered one. Neither direction ever regresses progress.

use super::models::{Chapter, MarkReadPolicy, Track};

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Chapters to persist with `read = true`, ascending by number.
    /// Never contains a chapter that was already read on input.
    pub chapter_updates: Vec<Chapter>,
    /// Number of the last chapter of the contiguous read prefix, `0.0` when empty.
    pub local_watermark: f64,
    /// Track to push to the tracker and mirror locally.
    pub track: Track,
}

impl Reconciliation {
    pub fn advances_remote(&self, remote: &Track) -> bool {
        self.track.last_chapter_read > remote.last_chapter_read
    }
}

/// Merge `chapters` (one series) with the `remote` track under `policy`.
///
/// Inputs are left untouched; the result describes what to persist.
pub fn reconcile(chapters: &[Chapter], remote: &Track, policy: MarkReadPolicy) -> Reconciliation {
    let mut sorted: Vec<&Chapter> = chapters.iter().collect();
    sorted.sort_by(|a, b| a.number.total_cmp(&b.number));

    let remote_read = remote.last_chapter_read;
    let marks_read = |chapter: &Chapter| {
        !chapter.read && chapter.number <= remote_read && policy.allows(chapter)
    };

    let chapter_updates: Vec<Chapter> = sorted
        .iter()
        .copied()
        .filter(|c| marks_read(c))
        .map(|c| Chapter {
            read: true,
            ..c.clone()
        })
        .collect();

    // chapters marked read above count toward the prefix
    let local_watermark = sorted
        .iter()
        .copied()
        .take_while(|c| c.read || marks_read(c))
        .last()
        .map(|c| c.number)
        .unwrap_or(0.0);

    let track = Track {
        last_chapter_read: remote_read.max(local_watermark),
        ..remote.clone()
    };

    tracing::debug!(
        series_id = remote.series_id,
        tracker_id = remote.tracker_id,
        ?policy,
        marked = chapter_updates.len(),
        local_watermark,
        remote_before = remote_read,
        remote_after = track.last_chapter_read,
        "reconciled chapters with tracker"
    );

    Reconciliation {
        chapter_updates,
        local_watermark,
        track,
    }
}
