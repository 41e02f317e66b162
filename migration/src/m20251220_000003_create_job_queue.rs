use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobQueue::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(JobQueue::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(JobQueue::QueueName).string_len(64).not_null())
                    .col(ColumnDef::new(JobQueue::Payload).json().not_null())
                    .col(
                        ColumnDef::new(JobQueue::DeliveryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(JobQueue::LockedBy).uuid())
                    .col(ColumnDef::new(JobQueue::LockedUntil).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(JobQueue::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_queue_name_created_at")
                    .table(JobQueue::Table)
                    .col(JobQueue::QueueName)
                    .col(JobQueue::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobQueue::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum JobQueue {
    Table,
    Id,
    QueueName,
    Payload,
    DeliveryCount,
    LockedBy,
    LockedUntil,
    CreatedAt,
}
