use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 流水来源
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum LedgerSource {
    /// 消费扣减（抽奖费用等）
    #[sea_orm(string_value = "spend")]
    Spend,
    /// 退款（如无可用奖品时返还抽奖费用）
    #[sea_orm(string_value = "refund")]
    Refund,
    /// 奖品核销后的派发
    #[sea_orm(string_value = "payout")]
    Payout,
    /// 运营手工调整
    #[sea_orm(string_value = "manual")]
    Manual,
}

impl std::fmt::Display for LedgerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerSource::Spend => write!(f, "spend"),
            LedgerSource::Refund => write!(f, "refund"),
            LedgerSource::Payout => write!(f, "payout"),
            LedgerSource::Manual => write!(f, "manual"),
        }
    }
}

/// 积分流水实体。只追加，不更新不删除；
/// 每行满足 balance_after = balance_before + delta，
/// 账户当前余额 = 该账户最近一行的 balance_after。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub app_id: i64,
    pub account_id: i64,
    /// 有符号变动额
    pub delta: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub source: LedgerSource,
    /// 关联业务对象（抽奖实例 / 兑换码等）
    pub reference_id: String,
    pub note: Option<String>,
    /// 幂等键，(app_id, account_id, idempotency_key) 唯一
    pub idempotency_key: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
