use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 终端用户目录，按 app 隔离。写入方为消息入口层（记录 last_seen 与封禁标记），
/// 本核心只在群发选取受众时读取。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub app_id: i64,
    /// 聊天平台侧的用户标识，也是本核心的 account_id
    pub chat_id: i64,
    pub last_seen_at: Option<DateTime<Utc>>,
    /// 已知封禁了 bot 的用户（来自投递失败反馈）
    pub bot_blocked: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
