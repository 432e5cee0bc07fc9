use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 转盘奖品配置实体。
/// - weight: 相对权重，选中概率 = weight / sum(weight)
/// - payout_amount: 核销后派发的积分，0 表示无积分奖励（如实物）
/// 配置由管理端编辑器写入，本核心只读。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub app_id: i64,
    /// app 内唯一的奖品编码
    pub code: String,
    /// 展示名称
    pub title: String,
    /// 相对权重，<=0 不参与抽取
    pub weight: i32,
    /// 核销派发积分
    pub payout_amount: i64,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 是否参与抽取（启用且权重为正）
    pub fn in_pool(&self) -> bool {
        self.is_active && self.weight > 0
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
