use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlayRecords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlayRecords::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PlayRecords::Uid).string().not_null())
                    .col(ColumnDef::new(PlayRecords::Email).string().not_null())
                    // JSON array of rows of fruit emoji
                    .col(ColumnDef::new(PlayRecords::Grid).text().not_null())
                    .col(ColumnDef::new(PlayRecords::Won).boolean().not_null())
                    // JSON array of line ids
                    .col(ColumnDef::new(PlayRecords::Matches).text().not_null())
                    .col(
                        ColumnDef::new(PlayRecords::PlayedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Per-user history on the profile page
        manager
            .create_index(
                Index::create()
                    .name("idx_play_records_uid")
                    .table(PlayRecords::Table)
                    .col(PlayRecords::Uid)
                    .to_owned(),
            )
            .await?;

        // Admin report groups by day
        manager
            .create_index(
                Index::create()
                    .name("idx_play_records_played_at")
                    .table(PlayRecords::Table)
                    .col(PlayRecords::PlayedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PlayRecords {
    Table,
    Id,
    Uid,
    Email,
    Grid,
    Won,
    Matches,
    PlayedAt,
    CreatedAt,
}
