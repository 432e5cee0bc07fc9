use sea_orm_migration::prelude::*;

/// Apps (租户注册表，写入方为平台管理端，这里只读)
#[derive(DeriveIden)]
enum Apps {
    Table,
    Id,
    Name,
    BotToken,
    BotUsername,
    SpinCost,
    CreatedAt,
}

/// Accounts (终端用户目录，按 app 隔离)
#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    AppId,
    ChatId,
    LastSeenAt,
    BotBlocked,
    CreatedAt,
}

/// Ledger Entries (积分流水，追加不改)
#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    AppId,
    AccountId,
    Delta,
    BalanceBefore,
    BalanceAfter,
    Source,
    ReferenceId,
    Note,
    IdempotencyKey,
    CreatedAt,
}

/// Account Balances (余额缓存，读优化)
#[derive(DeriveIden)]
enum AccountBalances {
    Table,
    Id,
    AppId,
    AccountId,
    Balance,
    UpdatedAt,
}

/// Prizes (转盘奖品配置)
#[derive(DeriveIden)]
enum Prizes {
    Table,
    Id,
    AppId,
    Code,
    Title,
    Weight,
    PayoutAmount,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// Wheel Spins (抽奖实例)
#[derive(DeriveIden)]
enum WheelSpins {
    Table,
    Id,
    AppId,
    AccountId,
    Status,
    PrizeCode,
    PrizeTitle,
    Cost,
    CreatedAt,
    WonAt,
    IssuedAt,
    RedeemedAt,
    DeclinedAt,
}

/// Redeem Grants (兑换码，由核销员确认)
#[derive(DeriveIden)]
enum RedeemGrants {
    Table,
    Id,
    AppId,
    AccountId,
    SpinId,
    Code,
    PrizeCode,
    Status,
    ActorId,
    CreatedAt,
    RedeemedAt,
    DeclinedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 租户表
        manager
            .create_table(
                Table::create()
                    .table(Apps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Apps::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Apps::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Apps::BotToken).string_len(255).null())
                    .col(ColumnDef::new(Apps::BotUsername).string_len(255).null())
                    .col(
                        ColumnDef::new(Apps::SpinCost)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Apps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 用户目录
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::AppId).big_integer().not_null())
                    .col(ColumnDef::new(Accounts::ChatId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Accounts::LastSeenAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::BotBlocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_accounts_app_chat_unique")
                    .table(Accounts::Table)
                    .col(Accounts::AppId)
                    .col(Accounts::ChatId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 积分流水表（只追加）
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::AppId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Delta).big_integer().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceBefore)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::Source)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::ReferenceId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Note).string_len(255).null())
                    .col(
                        ColumnDef::new(LedgerEntries::IdempotencyKey)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 幂等键唯一（仅非 NULL 行参与约束）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ledger_entries_idem_unique")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::AppId)
                    .col(LedgerEntries::AccountId)
                    .col(LedgerEntries::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 按账户取最近一行用于余额
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ledger_entries_account")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::AppId)
                    .col(LedgerEntries::AccountId)
                    .col(LedgerEntries::Id)
                    .to_owned(),
            )
            .await?;

        // 余额缓存表
        manager
            .create_table(
                Table::create()
                    .table(AccountBalances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountBalances::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountBalances::AppId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountBalances::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountBalances::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AccountBalances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_account_balances_unique")
                    .table(AccountBalances::Table)
                    .col(AccountBalances::AppId)
                    .col(AccountBalances::AccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 奖品配置表
        manager
            .create_table(
                Table::create()
                    .table(Prizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prizes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prizes::AppId).big_integer().not_null())
                    .col(ColumnDef::new(Prizes::Code).string_len(64).not_null())
                    .col(ColumnDef::new(Prizes::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Prizes::Weight).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Prizes::PayoutAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Prizes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Prizes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Prizes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prizes_app_code_unique")
                    .table(Prizes::Table)
                    .col(Prizes::AppId)
                    .col(Prizes::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 抽奖实例表
        manager
            .create_table(
                Table::create()
                    .table(WheelSpins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WheelSpins::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WheelSpins::AppId).big_integer().not_null())
                    .col(
                        ColumnDef::new(WheelSpins::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WheelSpins::Status).string_len(16).not_null())
                    .col(ColumnDef::new(WheelSpins::PrizeCode).string_len(64).null())
                    .col(ColumnDef::new(WheelSpins::PrizeTitle).string_len(255).null())
                    .col(
                        ColumnDef::new(WheelSpins::Cost)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WheelSpins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(WheelSpins::WonAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WheelSpins::IssuedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WheelSpins::RedeemedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WheelSpins::DeclinedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_wheel_spins_account_status")
                    .table(WheelSpins::Table)
                    .col(WheelSpins::AppId)
                    .col(WheelSpins::AccountId)
                    .col(WheelSpins::Status)
                    .to_owned(),
            )
            .await?;

        // 兑换码表
        manager
            .create_table(
                Table::create()
                    .table(RedeemGrants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RedeemGrants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RedeemGrants::AppId).big_integer().not_null())
                    .col(
                        ColumnDef::new(RedeemGrants::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RedeemGrants::SpinId).big_integer().not_null())
                    .col(ColumnDef::new(RedeemGrants::Code).string_len(16).not_null())
                    .col(
                        ColumnDef::new(RedeemGrants::PrizeCode)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RedeemGrants::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RedeemGrants::ActorId).big_integer().null())
                    .col(
                        ColumnDef::new(RedeemGrants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(RedeemGrants::RedeemedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RedeemGrants::DeclinedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 兑换码在 app 内唯一，冲突时重新生成
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_redeem_grants_app_code_unique")
                    .table(RedeemGrants::Table)
                    .col(RedeemGrants::AppId)
                    .col(RedeemGrants::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_redeem_grants_spin")
                    .table(RedeemGrants::Table)
                    .col(RedeemGrants::SpinId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RedeemGrants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WheelSpins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Prizes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountBalances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Apps::Table).to_owned())
            .await?;
        Ok(())
    }
}
