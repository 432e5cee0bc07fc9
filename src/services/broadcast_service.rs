use crate::config::BroadcastConfig;
use crate::entities::{
    BroadcastJobStatus, BroadcastSegment, BroadcastStatus, account_entity as accounts,
    app_entity as apps, broadcast_entity as broadcasts, broadcast_job_entity as jobs,
};
use crate::error::{AppError, AppResult};
use crate::external::{MessageButton, MessengerService, is_blocked_error};
use crate::models::{BroadcastReport, SendBroadcastRequest};
use chrono::{Duration, Utc};
use sea_orm::sea_query::{Expr, OnConflict, PostgresQueryBuilder, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;

/// 入库的错误文本上限（列宽 512，留出余量）
const MAX_ERROR_LEN: usize = 500;

/// 群发引擎。受众在开始时一次快照圈定，逐个投递并按结果分类计数；
/// 单个接收者失败只记录在 job 上，从不中断剩余投递。
#[derive(Clone)]
pub struct BroadcastService {
    pool: Arc<DatabaseConnection>,
    messenger: MessengerService,
    config: BroadcastConfig,
}

impl BroadcastService {
    pub fn new(
        pool: Arc<DatabaseConnection>,
        messenger: MessengerService,
        config: BroadcastConfig,
    ) -> Self {
        Self {
            pool,
            messenger,
            config,
        }
    }

    /// 发起一次群发
    ///
    /// 1. 无 bot 凭据 -> ConfigError，不落任何记录
    /// 2. 建 sending 状态的 broadcast 行
    /// 3. 圈定受众快照（segment 过滤，按活跃度倒序，封顶配置上限），记录 total
    /// 4. 逐个接收者：幂等建 job（重复入队跳过），投递并按结果分类
    /// 5. 受众遍历完成即 done，部分失败是正常结果
    ///
    /// 整个循环刻意不包事务：中途崩溃留下 sending 状态的 broadcast 行，
    /// 不自动续跑。
    pub async fn send(
        &self,
        app_id: i64,
        request: &SendBroadcastRequest,
    ) -> AppResult<BroadcastReport> {
        let app = apps::Entity::find_by_id(app_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("App not found".to_string()))?;
        let token = app.bot_token.as_deref().ok_or_else(|| {
            AppError::ConfigError("No delivery credential configured for this app".to_string())
        })?;

        if request.button_text.is_some() != request.button_url.is_some() {
            return Err(AppError::ValidationError(
                "button_text and button_url must be provided together".to_string(),
            ));
        }
        let button = match (&request.button_text, &request.button_url) {
            (Some(text), Some(url)) => Some(MessageButton {
                text: text.clone(),
                url: url.clone(),
            }),
            _ => None,
        };

        let broadcast = broadcasts::ActiveModel {
            app_id: Set(app_id),
            text: Set(request.text.clone()),
            segment: Set(request.segment),
            button_text: Set(request.button_text.clone()),
            button_url: Set(request.button_url.clone()),
            status: Set(BroadcastStatus::Sending),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        // 受众快照：开始后名单不再变化
        let audience = self.resolve_audience(app_id, request.segment).await?;
        let total = audience.len() as i64;

        {
            let mut am = broadcast.clone().into_active_model();
            am.total = Set(total);
            am.update(self.pool.as_ref()).await?;
        }

        let mut sent = 0i64;
        let mut failed = 0i64;
        let mut blocked = 0i64;

        for recipient in &audience {
            // 幂等入队：同一 broadcast 内重复的接收者是 no-op
            let inserted = self.enqueue_job(broadcast.id, recipient.chat_id).await?;
            if !inserted {
                continue;
            }

            match self
                .messenger
                .send_message(token, recipient.chat_id, &request.text, button.as_ref())
                .await
            {
                Ok(()) => {
                    sent += 1;
                    self.finish_job(broadcast.id, recipient.chat_id, BroadcastJobStatus::Sent, None)
                        .await?;
                }
                Err(AppError::ExternalApiError(body)) if is_blocked_error(&body) => {
                    blocked += 1;
                    self.finish_job(
                        broadcast.id,
                        recipient.chat_id,
                        BroadcastJobStatus::Blocked,
                        Some(&body),
                    )
                    .await?;
                    // 回写目录里的封禁标记，供 not_blocked 圈选使用
                    self.mark_account_blocked(app_id, recipient.chat_id).await;
                }
                Err(err) => {
                    failed += 1;
                    let msg = err.to_string();
                    log::warn!(
                        "Broadcast {} delivery to {} failed: {msg}",
                        broadcast.id,
                        recipient.chat_id
                    );
                    self.finish_job(
                        broadcast.id,
                        recipient.chat_id,
                        BroadcastJobStatus::Failed,
                        Some(&msg),
                    )
                    .await?;
                }
            }
        }

        let mut am = broadcast.clone().into_active_model();
        am.sent = Set(sent);
        am.failed = Set(failed);
        am.blocked = Set(blocked);
        am.status = Set(BroadcastStatus::Done);
        am.finished_at = Set(Some(Utc::now()));
        am.update(self.pool.as_ref()).await?;

        Ok(BroadcastReport {
            broadcast_id: broadcast.id,
            total,
            sent,
            failed,
            blocked,
        })
    }

    /// segment 圈选，按最近活跃倒序，封顶 audience_cap
    async fn resolve_audience(
        &self,
        app_id: i64,
        segment: BroadcastSegment,
    ) -> AppResult<Vec<accounts::Model>> {
        let mut query = accounts::Entity::find().filter(accounts::Column::AppId.eq(app_id));

        match segment {
            BroadcastSegment::All => {}
            BroadcastSegment::Active => {
                let cutoff = Utc::now() - Duration::days(self.config.active_window_days);
                query = query.filter(accounts::Column::LastSeenAt.gte(cutoff));
            }
            BroadcastSegment::NotBlocked => {
                query = query.filter(accounts::Column::BotBlocked.eq(false));
            }
        }

        let list = query
            .order_by_desc(accounts::Column::LastSeenAt)
            .limit(self.config.audience_cap)
            .all(self.pool.as_ref())
            .await?;
        Ok(list)
    }

    /// 幂等插入 job 行。返回 false 表示该接收者已有 job（重复入队）。
    async fn enqueue_job(&self, broadcast_id: i64, account_id: i64) -> AppResult<bool> {
        let insert = Query::insert()
            .into_table(jobs::Entity)
            .columns([
                jobs::Column::BroadcastId,
                jobs::Column::AccountId,
                jobs::Column::Status,
            ])
            .values_panic([
                broadcast_id.into(),
                account_id.into(),
                BroadcastJobStatus::Queued.into(),
            ])
            .on_conflict(
                OnConflict::columns([jobs::Column::BroadcastId, jobs::Column::AccountId])
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();
        let (sql, values) = insert.build(PostgresQueryBuilder);
        let stmt =
            sea_orm::Statement::from_sql_and_values(sea_orm::DatabaseBackend::Postgres, sql, values);
        let res = self.pool.execute(stmt).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn finish_job(
        &self,
        broadcast_id: i64,
        account_id: i64,
        status: BroadcastJobStatus,
        error: Option<&str>,
    ) -> AppResult<()> {
        jobs::Entity::update_many()
            .col_expr(jobs::Column::Status, Expr::value(status))
            .col_expr(
                jobs::Column::Error,
                Expr::value(error.map(|e| truncate_error(e, MAX_ERROR_LEN))),
            )
            .col_expr(jobs::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(jobs::Column::BroadcastId.eq(broadcast_id))
            .filter(jobs::Column::AccountId.eq(account_id))
            .exec(self.pool.as_ref())
            .await?;
        Ok(())
    }

    /// 目录封禁标记是派生信息，更新失败只记日志
    async fn mark_account_blocked(&self, app_id: i64, chat_id: i64) {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::BotBlocked, Expr::value(true))
            .filter(accounts::Column::AppId.eq(app_id))
            .filter(accounts::Column::ChatId.eq(chat_id))
            .exec(self.pool.as_ref())
            .await;
        if let Err(e) = result {
            log::warn!("Failed to flag blocked account {chat_id} in app {app_id}: {e:?}");
        }
    }
}

/// 按字符边界截断错误文本
fn truncate_error(msg: &str, max_chars: usize) -> String {
    msg.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_error_short_passthrough() {
        assert_eq!(truncate_error("chat not found", 500), "chat not found");
    }

    #[test]
    fn test_truncate_error_respects_char_boundary() {
        let long = "错".repeat(600);
        let truncated = truncate_error(&long, 500);
        assert_eq!(truncated.chars().count(), 500);
    }
}
