// Mapping between storage rows, tracker DTOs and domain models

use entities::{chapter, track};
use sea_orm::ActiveValue::{NotSet, Set};

use super::models::{Chapter, Track};
use crate::tracker_client::RemoteTrack;

pub fn map_chapter(row: chapter::Model) -> Chapter {
    Chapter {
        id: row.id,
        series_id: row.series_id,
        name: row.name,
        number: row.number,
        read: row.read,
    }
}

pub fn map_track(row: track::Model) -> Track {
    Track {
        id: row.id,
        series_id: row.series_id,
        tracker_id: row.tracker_id,
        remote_id: row.remote_id,
        title: row.title,
        last_chapter_read: row.last_chapter_read,
        total_chapters: row.total_chapters,
        last_synced_at: row.last_synced_at,
    }
}

/// Active model for the track upsert. The primary key is left unset so the
/// (series_id, tracker_id) conflict target decides between insert and update.
pub fn track_to_active(track: &Track) -> track::ActiveModel {
    track::ActiveModel {
        id: NotSet,
        series_id: Set(track.series_id),
        tracker_id: Set(track.tracker_id),
        remote_id: Set(track.remote_id),
        title: Set(track.title.clone()),
        last_chapter_read: Set(track.last_chapter_read),
        total_chapters: Set(track.total_chapters),
        last_synced_at: Set(track.last_synced_at),
    }
}

/// Overlay what the tracker reports onto the local mirror.
pub fn merge_remote_track(local: &Track, remote: &RemoteTrack) -> Track {
    Track {
        // trackers report negative values for "not started" on some services
        last_chapter_read: remote.last_chapter_read.max(0.0),
        total_chapters: remote.total_chapters.unwrap_or(local.total_chapters),
        title: remote.title.clone().unwrap_or_else(|| local.title.clone()),
        ..local.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> Track {
        Track {
            id: 3,
            series_id: 10,
            tracker_id: 1,
            remote_id: 99,
            title: "Local title".into(),
            last_chapter_read: 4.0,
            total_chapters: 20,
            last_synced_at: None,
        }
    }

    #[test]
    fn remote_values_override_mirror() {
        let remote = RemoteTrack {
            id: 99,
            last_chapter_read: 7.5,
            total_chapters: Some(24),
            title: Some("Remote title".into()),
        };
        let merged = merge_remote_track(&local(), &remote);
        assert_eq!(merged.last_chapter_read, 7.5);
        assert_eq!(merged.total_chapters, 24);
        assert_eq!(merged.title, "Remote title");
        assert_eq!(merged.id, 3);
        assert_eq!(merged.series_id, 10);
    }

    #[test]
    fn missing_remote_fields_keep_mirror() {
        let remote = RemoteTrack {
            id: 99,
            last_chapter_read: -1.0,
            total_chapters: None,
            title: None,
        };
        let merged = merge_remote_track(&local(), &remote);
        assert_eq!(merged.last_chapter_read, 0.0);
        assert_eq!(merged.total_chapters, 20);
        assert_eq!(merged.title, "Local title");
    }

    #[test]
    fn chapter_row_maps_fields() {
        let row = chapter::Model {
            id: 5,
            series_id: 10,
            name: "Extra".into(),
            number: 10.5,
            read: true,
        };
        let c = map_chapter(row);
        assert_eq!(c.number, 10.5);
        assert!(c.read);
        assert!(!c.is_whole_numbered());
    }
}
