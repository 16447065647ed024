// Domain models, independent of the storage rows and the tracker wire format

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: i32,
    pub series_id: i32,
    pub name: String,
    /// Ordinal within the series. Special chapters carry a fractional part (10.5).
    pub number: f64,
    pub read: bool,
}

impl Chapter {
    pub fn is_whole_numbered(&self) -> bool {
        self.number.fract() == 0.0
    }
}

/// Progress record for one series on one tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: i32,
    pub series_id: i32,
    pub tracker_id: i32,
    /// Identifier of the entry on the tracker side
    pub remote_id: i64,
    pub title: String,
    /// Highest chapter number the tracker considers read. Never negative.
    pub last_chapter_read: f64,
    pub total_chapters: i32,
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Which local chapters may be marked read from the tracker's watermark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkReadPolicy {
    Never,
    #[default]
    Always,
    /// Whole-numbered chapters only
    ExcludeFractional,
}

impl MarkReadPolicy {
    pub fn allows(self, chapter: &Chapter) -> bool {
        match self {
            MarkReadPolicy::Never => false,
            MarkReadPolicy::Always => true,
            MarkReadPolicy::ExcludeFractional => chapter.is_whole_numbered(),
        }
    }
}
