use crate::entities::{
    GrantKind, GrantStatus, LedgerSource, SpinStatus, redeem_grant_entity as grants,
    wheel_spin_entity as spins,
};
use crate::error::{AppError, AppResult};
use crate::models::ConfirmResponse;
use crate::services::{LedgerService, PrizeCatalogService};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;

/// 兑换码查找的固定优先级：先转盘，后护照集章
const GRANT_KIND_PRIORITY: [GrantKind; 2] = [GrantKind::Wheel, GrantKind::Passport];

/// 核销确认流程。由第二方（核销员）通过短码驱动，
/// issued -> redeemed / declined 的转移用条件更新做互斥，
/// 0 行受影响意味着别的请求已处理，不是错误。
#[derive(Clone)]
pub struct RedeemService {
    pool: Arc<DatabaseConnection>,
    ledger: LedgerService,
    catalog: PrizeCatalogService,
}

impl RedeemService {
    pub fn new(
        pool: Arc<DatabaseConnection>,
        ledger: LedgerService,
        catalog: PrizeCatalogService,
    ) -> Self {
        Self {
            pool,
            ledger,
            catalog,
        }
    }

    /// 确认核销。
    ///
    /// - 未知短码 -> NotFound，无任何副作用
    /// - issued -> redeemed 条件更新成功 -> 从目录取派发金额并记账，
    ///   幂等键由 (实例, 短码, 金额) 派生，聊天传输重投同一条确认不会二次派发；
    ///   金额为 0 的奖品跳过记账
    /// - 已是 redeemed -> already_processed=true，本次派发 0
    /// - 已是 declined -> 终态不重开，按未找到处理
    pub async fn confirm(
        &self,
        app_id: i64,
        code: &str,
        actor_id: i64,
    ) -> AppResult<ConfirmResponse> {
        let grant = self
            .find_grant(app_id, code)
            .await?
            .ok_or_else(|| AppError::NotFound("Redeem code not found".to_string()))?;

        let updated = grants::Entity::update_many()
            .col_expr(grants::Column::Status, Expr::value(GrantStatus::Redeemed))
            .col_expr(grants::Column::ActorId, Expr::value(Some(actor_id)))
            .col_expr(grants::Column::RedeemedAt, Expr::value(Some(Utc::now())))
            .filter(grants::Column::Id.eq(grant.id))
            .filter(grants::Column::Status.eq(GrantStatus::Issued))
            .exec(self.pool.as_ref())
            .await?;

        if updated.rows_affected == 0 {
            // 竞争失败或重复确认：按当前状态回答，绝不二次派发
            let current = grants::Entity::find_by_id(grant.id)
                .one(self.pool.as_ref())
                .await?
                .ok_or_else(|| AppError::NotFound("Redeem code not found".to_string()))?;
            return match current.status {
                GrantStatus::Redeemed => Ok(ConfirmResponse {
                    paid_amount: 0,
                    already_processed: true,
                }),
                // declined 是终态，不能经由确认重开
                _ => Err(AppError::NotFound(
                    "Redeem code already declined".to_string(),
                )),
            };
        }

        if grant.kind == GrantKind::Wheel {
            self.transition_spin(grant.spin_id, SpinStatus::Redeemed)
                .await?;
        }

        // 奖品被下架时按 0 处理：确认本身仍成立，只是无积分可派
        let payout = self
            .catalog
            .get(app_id, &grant.prize_code)
            .await?
            .map(|p| p.payout_amount)
            .unwrap_or(0);

        if payout > 0 {
            self.ledger
                .apply_delta(
                    app_id,
                    grant.account_id,
                    payout,
                    LedgerSource::Payout,
                    &format!("redeem_grant:{}", grant.id),
                    Some("Prize payout"),
                    Some(&format!("redeem:{}:{}:{payout}", grant.spin_id, grant.code)),
                    false,
                )
                .await?;
        }

        Ok(ConfirmResponse {
            paid_amount: payout,
            already_processed: false,
        })
    }

    /// 拒绝核销：issued -> declined，记录操作者，无任何流水影响。
    /// 重复拒绝幂等成功；已确认的短码不可再拒绝。
    pub async fn decline(&self, app_id: i64, code: &str, actor_id: i64) -> AppResult<()> {
        let grant = self
            .find_grant(app_id, code)
            .await?
            .ok_or_else(|| AppError::NotFound("Redeem code not found".to_string()))?;

        let updated = grants::Entity::update_many()
            .col_expr(grants::Column::Status, Expr::value(GrantStatus::Declined))
            .col_expr(grants::Column::ActorId, Expr::value(Some(actor_id)))
            .col_expr(grants::Column::DeclinedAt, Expr::value(Some(Utc::now())))
            .filter(grants::Column::Id.eq(grant.id))
            .filter(grants::Column::Status.eq(GrantStatus::Issued))
            .exec(self.pool.as_ref())
            .await?;

        if updated.rows_affected == 0 {
            let current = grants::Entity::find_by_id(grant.id)
                .one(self.pool.as_ref())
                .await?
                .ok_or_else(|| AppError::NotFound("Redeem code not found".to_string()))?;
            return match current.status {
                GrantStatus::Declined => Ok(()),
                _ => Err(AppError::NotFound(
                    "Redeem code already processed".to_string(),
                )),
            };
        }

        if grant.kind == GrantKind::Wheel {
            self.transition_spin(grant.spin_id, SpinStatus::Declined)
                .await?;
        }

        Ok(())
    }

    /// 按固定优先级逐类查找短码，返回第一个匹配
    async fn find_grant(&self, app_id: i64, code: &str) -> AppResult<Option<grants::Model>> {
        for kind in GRANT_KIND_PRIORITY {
            let found = grants::Entity::find()
                .filter(grants::Column::AppId.eq(app_id))
                .filter(grants::Column::Code.eq(code))
                .filter(grants::Column::Kind.eq(kind))
                .order_by_desc(grants::Column::Id)
                .one(self.pool.as_ref())
                .await?;
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }

    /// 父实例 issued -> redeemed/declined；0 行受影响记日志容忍
    async fn transition_spin(&self, spin_id: i64, to: SpinStatus) -> AppResult<()> {
        let ts_col = match to {
            SpinStatus::Redeemed => spins::Column::RedeemedAt,
            _ => spins::Column::DeclinedAt,
        };
        let updated = spins::Entity::update_many()
            .col_expr(spins::Column::Status, Expr::value(to))
            .col_expr(ts_col, Expr::value(Some(Utc::now())))
            .filter(spins::Column::Id.eq(spin_id))
            .filter(spins::Column::Status.eq(SpinStatus::Issued))
            .exec(self.pool.as_ref())
            .await?;
        if updated.rows_affected == 0 {
            log::info!("Spin {spin_id} already transitioned, skipping {to}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn grant(id: i64, status: GrantStatus) -> grants::Model {
        grants::Model {
            id,
            app_id: 1,
            account_id: 7,
            spin_id: 5,
            code: "CODE42".to_string(),
            prize_code: "coffee".to_string(),
            status,
            actor_id: None,
            kind: GrantKind::Wheel,
            created_at: None,
            redeemed_at: None,
            declined_at: None,
        }
    }

    fn service(db: DatabaseConnection) -> RedeemService {
        let pool = Arc::new(db);
        RedeemService::new(
            pool.clone(),
            LedgerService::new(pool.clone()),
            PrizeCatalogService::new(pool.clone()),
        )
    }

    #[tokio::test]
    async fn test_repeat_confirm_reports_already_processed() {
        // 条件更新 0 行 + 重读为 redeemed：别处已确认过，
        // 本次不派发积分（mock 未准备任何记账结果，多走一步会失败）
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // 按 kind 优先级查短码：wheel 命中（读到竞争前的快照）
            .append_query_results([vec![grant(9, GrantStatus::Issued)]])
            // 0 行后重读当前状态
            .append_query_results([vec![grant(9, GrantStatus::Redeemed)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = service(db).confirm(1, "CODE42", 99).await.unwrap();
        assert!(result.already_processed);
        assert_eq!(result.paid_amount, 0);
    }

    #[tokio::test]
    async fn test_confirm_declined_code_stays_terminal() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![grant(9, GrantStatus::Issued)]])
            .append_query_results([vec![grant(9, GrantStatus::Declined)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = service(db).confirm(1, "CODE42", 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
