use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Track::Table)
                    .if_not_exists()
                    .col(pk_auto(Track::Id))
                    .col(integer(Track::SeriesId))
                    .col(integer(Track::TrackerId))
                    .col(big_integer(Track::RemoteId))
                    .col(string(Track::Title))
                    .col(double(Track::LastChapterRead).default(0.0))
                    .col(integer(Track::TotalChapters).default(0))
                    .col(timestamp_with_time_zone_null(Track::LastSyncedAt))
                    .to_owned(),
            )
            .await?;

        // one mirror per tracker per series; the upsert conflicts on this
        manager
            .create_index(
                Index::create()
                    .name("idx_track_series_tracker")
                    .table(Track::Table)
                    .col(Track::SeriesId)
                    .col(Track::TrackerId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Track::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Track {
    Table,
    Id,
    SeriesId,
    TrackerId,
    RemoteId,
    Title,
    LastChapterRead,
    TotalChapters,
    LastSyncedAt,
}
