use chrono::{DateTime, Utc};
use poem_openapi::{ApiResponse, Enum, Object, payload::Json};

use crate::domain::{
    models::{Chapter, MarkReadPolicy, Track},
    reconcile::Reconciliation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[oai(rename_all = "snake_case")]
pub enum MarkReadPolicyDto {
    Never,
    Always,
    ExcludeFractional,
}

impl From<MarkReadPolicyDto> for MarkReadPolicy {
    fn from(dto: MarkReadPolicyDto) -> Self {
        match dto {
            MarkReadPolicyDto::Never => MarkReadPolicy::Never,
            MarkReadPolicyDto::Always => MarkReadPolicy::Always,
            MarkReadPolicyDto::ExcludeFractional => MarkReadPolicy::ExcludeFractional,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct ChapterDto {
    pub id: i32,
    pub name: String,
    pub number: f64,
    pub read: bool,
}

impl From<Chapter> for ChapterDto {
    fn from(c: Chapter) -> Self {
        ChapterDto {
            id: c.id,
            name: c.name,
            number: c.number,
            read: c.read,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct TrackDto {
    pub series_id: i32,
    pub tracker_id: i32,
    pub remote_id: i64,
    pub title: String,
    pub last_chapter_read: f64,
    pub total_chapters: i32,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl From<Track> for TrackDto {
    fn from(t: Track) -> Self {
        TrackDto {
            series_id: t.series_id,
            tracker_id: t.tracker_id,
            remote_id: t.remote_id,
            title: t.title,
            last_chapter_read: t.last_chapter_read,
            total_chapters: t.total_chapters,
            last_synced_at: t.last_synced_at,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct SyncResultDto {
    /// Numbers of the chapters marked read from the tracker's watermark
    pub chapters_marked_read: Vec<f64>,
    /// End of the contiguous run of read chapters
    pub local_watermark: f64,
    /// Watermark pushed to the tracker
    pub last_chapter_read: f64,
}

impl From<&Reconciliation> for SyncResultDto {
    fn from(r: &Reconciliation) -> Self {
        SyncResultDto {
            chapters_marked_read: r.chapter_updates.iter().map(|c| c.number).collect(),
            local_watermark: r.local_watermark,
            last_chapter_read: r.track.last_chapter_read,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct ErrorDto {
    /// Human-readable error message
    pub message: String,
}

impl From<String> for ErrorDto {
    fn from(message: String) -> Self {
        ErrorDto { message }
    }
}

#[derive(Debug, Clone, Object)]
pub struct TrackerStatusDto {
    pub app: Option<String>,
    pub version: Option<String>,
}

#[derive(ApiResponse)]
pub enum TrackerStatusResponseDto {
    /// Tracker answered its status endpoint
    #[oai(status = 200)]
    Ok(Json<TrackerStatusDto>),

    /// Tracker unreachable or answered with an error
    #[oai(status = 502)]
    BadGateway(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum ChapterListResponseDto {
    /// Chapters of the series, ascending by number
    #[oai(status = 200)]
    Ok(Json<Vec<ChapterDto>>),

    #[oai(status = 500)]
    InternalError(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum TrackResponseDto {
    /// Local mirror of the tracker record
    #[oai(status = 200)]
    Ok(Json<TrackDto>),

    #[oai(status = 404)]
    NotFound(Json<ErrorDto>),

    #[oai(status = 500)]
    InternalError(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum SyncResponseDto {
    /// Reconciled; tracker push and local writes continue in the background
    #[oai(status = 202)]
    Accepted(Json<SyncResultDto>),

    /// Series is not tracked on this tracker
    #[oai(status = 404)]
    NotFound(Json<ErrorDto>),

    /// Tracker or storage failure before reconciling
    #[oai(status = 502)]
    BadGateway(Json<ErrorDto>),
}
