use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum RedeemGrants {
    Table,
    Kind,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 护照集章的兑换与转盘共用核销流程，兑换码按 kind 区分来源。
/// 存量数据全部来自转盘，默认 'wheel'。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(RedeemGrants::Table)
                    .add_column(
                        ColumnDef::new(RedeemGrants::Kind)
                            .string_len(16)
                            .not_null()
                            .default("wheel"),
                    )
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(RedeemGrants::Table)
                    .drop_column(RedeemGrants::Kind)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
