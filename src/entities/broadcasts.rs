use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 群发受众圈选
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "snake_case")]
pub enum BroadcastSegment {
    /// 全部用户
    #[sea_orm(string_value = "all")]
    All,
    /// 最近 N 天内活跃（N 为配置项）
    #[sea_orm(string_value = "active")]
    Active,
    /// 未知封禁 bot 的用户
    #[sea_orm(string_value = "not_blocked")]
    NotBlocked,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum BroadcastStatus {
    #[sea_orm(string_value = "sending")]
    Sending,
    /// 受众遍历完成，部分失败也是 done
    #[sea_orm(string_value = "done")]
    Done,
}

/// 一次群发任务。受众在任务开始时一次性圈定，计数器在收尾时落库。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "broadcasts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub app_id: i64,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub segment: BroadcastSegment,
    /// 可选的行动按钮
    pub button_text: Option<String>,
    pub button_url: Option<String>,
    pub total: i64,
    pub sent: i64,
    pub failed: i64,
    pub blocked: i64,
    pub status: BroadcastStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
