use sea_orm_migration::prelude::*;

use super::m20251220_000001_create_jobs::Jobs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BrokenLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BrokenLinks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BrokenLinks::JobId).uuid().not_null())
                    .col(ColumnDef::new(BrokenLinks::SourceUrl).text().not_null())
                    .col(ColumnDef::new(BrokenLinks::BrokenUrl).text().not_null())
                    .col(ColumnDef::new(BrokenLinks::AnchorText).string_len(100))
                    .col(
                        ColumnDef::new(BrokenLinks::StatusCode)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokenLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_broken_links_job_id")
                            .from(BrokenLinks::Table, BrokenLinks::JobId)
                            .to(Jobs::Table, Jobs::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One finding per (job, broken url, source url); redelivered jobs rely on it
        manager
            .create_index(
                Index::create()
                    .name("uq_broken_links_job_broken_source")
                    .table(BrokenLinks::Table)
                    .col(BrokenLinks::JobId)
                    .col(BrokenLinks::BrokenUrl)
                    .col(BrokenLinks::SourceUrl)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BrokenLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BrokenLinks {
    Table,
    Id,
    JobId,
    SourceUrl,
    BrokenUrl,
    AnchorText,
    StatusCode,
    CreatedAt,
}
