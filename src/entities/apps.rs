use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 租户（小程序应用）注册表。增删改由平台管理端负责，本服务只读。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "apps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Bot API token，缺失时该 app 无法发送任何消息
    pub bot_token: Option<String>,
    /// 用于拼接 deep link 的 bot 用户名
    pub bot_username: Option<String>,
    /// 单次抽奖扣费
    pub spin_cost: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
