use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 抽奖实例生命周期:
/// new -> won -> issued -> redeemed，won/issued 可分支到 declined。
/// 每个账户同一时间至多一个 won（未领取）实例。
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum SpinStatus {
    /// 已创建，尚未完成选奖（扣费进行中）
    #[sea_orm(string_value = "new")]
    New,
    /// 已中奖，等待用户领取
    #[sea_orm(string_value = "won")]
    Won,
    /// 已生成兑换码，等待核销
    #[sea_orm(string_value = "issued")]
    Issued,
    /// 核销完成，积分已派发
    #[sea_orm(string_value = "redeemed")]
    Redeemed,
    /// 核销员拒绝，终态
    #[sea_orm(string_value = "declined")]
    Declined,
}

impl std::fmt::Display for SpinStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpinStatus::New => write!(f, "new"),
            SpinStatus::Won => write!(f, "won"),
            SpinStatus::Issued => write!(f, "issued"),
            SpinStatus::Redeemed => write!(f, "redeemed"),
            SpinStatus::Declined => write!(f, "declined"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "wheel_spins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub app_id: i64,
    pub account_id: i64,
    pub status: SpinStatus,
    /// 中奖后填入
    pub prize_code: Option<String>,
    pub prize_title: Option<String>,
    /// 创建时记录的抽奖费用
    pub cost: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub won_at: Option<DateTime<Utc>>,
    pub issued_at: Option<DateTime<Utc>>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
