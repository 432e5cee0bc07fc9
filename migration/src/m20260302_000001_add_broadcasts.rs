use sea_orm_migration::prelude::*;

/// Broadcasts (群发任务)
#[derive(DeriveIden)]
enum Broadcasts {
    Table,
    Id,
    AppId,
    Text,
    Segment,
    ButtonText,
    ButtonUrl,
    Total,
    Sent,
    Failed,
    Blocked,
    Status,
    CreatedAt,
    FinishedAt,
}

/// Broadcast Jobs (单个接收者的投递状态)
#[derive(DeriveIden)]
enum BroadcastJobs {
    Table,
    Id,
    BroadcastId,
    AccountId,
    Status,
    Error,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Broadcasts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Broadcasts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Broadcasts::AppId).big_integer().not_null())
                    .col(ColumnDef::new(Broadcasts::Text).text().not_null())
                    .col(ColumnDef::new(Broadcasts::Segment).string_len(32).not_null())
                    .col(ColumnDef::new(Broadcasts::ButtonText).string_len(255).null())
                    .col(ColumnDef::new(Broadcasts::ButtonUrl).string_len(1024).null())
                    .col(
                        ColumnDef::new(Broadcasts::Total)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Broadcasts::Sent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Broadcasts::Failed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Broadcasts::Blocked)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Broadcasts::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Broadcasts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Broadcasts::FinishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BroadcastJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BroadcastJobs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BroadcastJobs::BroadcastId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BroadcastJobs::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BroadcastJobs::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BroadcastJobs::Error).string_len(512).null())
                    .col(
                        ColumnDef::new(BroadcastJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(BroadcastJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一个广播内每个接收者只有一条 job，重复入队为 no-op
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_broadcast_jobs_unique")
                    .table(BroadcastJobs::Table)
                    .col(BroadcastJobs::BroadcastId)
                    .col(BroadcastJobs::AccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BroadcastJobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Broadcasts::Table).to_owned())
            .await?;
        Ok(())
    }
}
