use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    /// 已发码，等待核销员确认
    #[sea_orm(string_value = "issued")]
    Issued,
    /// 已确认，积分已派发
    #[sea_orm(string_value = "redeemed")]
    Redeemed,
    /// 已拒绝，终态
    #[sea_orm(string_value = "declined")]
    Declined,
}

impl std::fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrantStatus::Issued => write!(f, "issued"),
            GrantStatus::Redeemed => write!(f, "redeemed"),
            GrantStatus::Declined => write!(f, "declined"),
        }
    }
}

/// 兑换码来源。转盘与护照集章共用同一核销流程，
/// 按 kind 区分，核销查找时按固定优先级逐类尝试。
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    #[sea_orm(string_value = "wheel")]
    Wheel,
    #[sea_orm(string_value = "passport")]
    Passport,
}

/// 短码兑换凭证。领奖时生成，由第二方（核销员）在 bot 内确认或拒绝。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "redeem_grants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub app_id: i64,
    pub account_id: i64,
    /// 关联的抽奖实例
    pub spin_id: i64,
    /// 人可读短码，app 内唯一
    pub code: String,
    /// 用于核销时反查派发金额
    pub prize_code: String,
    pub status: GrantStatus,
    /// 执行确认/拒绝的核销员
    pub actor_id: Option<i64>,
    pub kind: GrantKind,
    pub created_at: Option<DateTime<Utc>>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
