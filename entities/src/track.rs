use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Local mirror of a remote tracker record, one row per (series, tracker).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "track")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub series_id: i32,
    pub tracker_id: i32,
    pub remote_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Double")]
    pub last_chapter_read: f64,
    pub total_chapters: i32,
    pub last_synced_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
