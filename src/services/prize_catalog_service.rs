use crate::entities::prize_entity as prizes;
use crate::error::AppResult;
use crate::models::PrizeResponse;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

/// 奖品目录只读访问。写入属于管理端协作方，本核心不改目录。
#[derive(Clone)]
pub struct PrizeCatalogService {
    pool: Arc<DatabaseConnection>,
}

impl PrizeCatalogService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    /// 参与抽取的奖品池：启用且权重为正，按 id 固定顺序
    /// （顺序固定保证权重累加遍历的平局裁决稳定）
    pub async fn list_active(&self, app_id: i64) -> AppResult<Vec<prizes::Model>> {
        let list = prizes::Entity::find()
            .filter(prizes::Column::AppId.eq(app_id))
            .filter(prizes::Column::IsActive.eq(true))
            .filter(prizes::Column::Weight.gt(0))
            .order_by_asc(prizes::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        Ok(list)
    }

    /// 按编码取单个奖品（核销时反查派发金额）
    pub async fn get(&self, app_id: i64, code: &str) -> AppResult<Option<prizes::Model>> {
        let found = prizes::Entity::find()
            .filter(prizes::Column::AppId.eq(app_id))
            .filter(prizes::Column::Code.eq(code))
            .one(self.pool.as_ref())
            .await?;
        Ok(found)
    }

    /// 对外展示用的目录视图
    pub async fn list_view(&self, app_id: i64) -> AppResult<Vec<PrizeResponse>> {
        let list = self.list_active(app_id).await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}
