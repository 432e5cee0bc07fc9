use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 余额缓存。仅作为读优化由流水写入方顺带维护，
/// 真实余额始终以 ledger_entries 最近一行为准。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "account_balances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub app_id: i64,
    pub account_id: i64,
    pub balance: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
