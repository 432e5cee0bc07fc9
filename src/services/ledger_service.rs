use crate::entities::{
    LedgerSource, account_balance_entity as balances, ledger_entry_entity as entries,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    LedgerApply, LedgerEntryResponse, PaginatedResponse, PaginationParams, WalletQuery,
    WalletResponse,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict, PostgresQueryBuilder, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use std::sync::Arc;

/// 积分流水服务。所有余额变动都从这里走：
/// 流水只追加，余额 = 账户最近一行的 balance_after，
/// 幂等键保证同一逻辑事件重试不会重复入账。
#[derive(Clone)]
pub struct LedgerService {
    pool: Arc<DatabaseConnection>,
}

impl LedgerService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    /// 账户当前余额（无流水时为 0）
    pub async fn current_balance(&self, app_id: i64, account_id: i64) -> AppResult<i64> {
        Ok(Self::latest_balance(self.pool.as_ref(), app_id, account_id).await?)
    }

    /// 追加一条流水。
    ///
    /// - 幂等键已存在 -> no-op，返回当前余额且 applied=false
    /// - 结果余额为负且未授权负余额 -> InsufficientBalance，不追加
    /// - 并发重试导致的幂等键唯一冲突 -> 当作已应用，不向上传播
    /// - 成功后尽力更新余额缓存，缓存失败只记日志不回滚
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_delta(
        &self,
        app_id: i64,
        account_id: i64,
        delta: i64,
        source: LedgerSource,
        reference_id: &str,
        note: Option<&str>,
        idempotency_key: Option<&str>,
        allow_negative: bool,
    ) -> AppResult<LedgerApply> {
        let txn = self.pool.begin().await?;

        // 幂等短路：同一逻辑事件已入账过
        if let Some(key) = idempotency_key {
            let existing = entries::Entity::find()
                .filter(entries::Column::AppId.eq(app_id))
                .filter(entries::Column::AccountId.eq(account_id))
                .filter(entries::Column::IdempotencyKey.eq(key))
                .one(&txn)
                .await?;
            if existing.is_some() {
                let balance = Self::latest_balance(&txn, app_id, account_id).await?;
                txn.commit().await?;
                return Ok(LedgerApply {
                    balance_after: balance,
                    applied: false,
                });
            }
        }

        let before = Self::latest_balance(&txn, app_id, account_id).await?;
        let after = before + delta;
        if after < 0 && !allow_negative {
            return Err(AppError::InsufficientBalance {
                balance: before,
                cost: -delta,
            });
        }

        let insert_result = entries::ActiveModel {
            app_id: Set(app_id),
            account_id: Set(account_id),
            delta: Set(delta),
            balance_before: Set(before),
            balance_after: Set(after),
            source: Set(source),
            reference_id: Set(reference_id.to_string()),
            note: Set(note.map(|s| s.to_string())),
            idempotency_key: Set(idempotency_key.map(|s| s.to_string())),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        match insert_result {
            Ok(_) => {}
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    // 并发重试在检查与写入之间抢先入账了同一事件，
                    // 等价于幂等命中，读回当前余额即可
                    drop(txn);
                    log::info!(
                        "Ledger idempotency key collision treated as applied: app={app_id} account={account_id} key={idempotency_key:?}"
                    );
                    let balance =
                        Self::latest_balance(self.pool.as_ref(), app_id, account_id).await?;
                    return Ok(LedgerApply {
                        balance_after: balance,
                        applied: false,
                    });
                }
                return Err(err.into());
            }
        }

        txn.commit().await?;

        // 余额缓存只是读优化，更新失败不影响流水
        if let Err(e) = self.upsert_balance_cache(app_id, account_id, after).await {
            log::warn!(
                "Failed to update balance cache for app={app_id} account={account_id}: {e:?}"
            );
        }

        Ok(LedgerApply {
            balance_after: after,
            applied: true,
        })
    }

    /// 余额足够时扣费。cost <= 0 视为成功的 no-op。
    /// 先读后写，对同账户并发扣费不可线性化；真正的安全底线是幂等键。
    pub async fn spend_if_enough(
        &self,
        app_id: i64,
        account_id: i64,
        cost: i64,
        reference_id: &str,
        note: Option<&str>,
        idempotency_key: Option<&str>,
    ) -> AppResult<LedgerApply> {
        if cost <= 0 {
            let balance = self.current_balance(app_id, account_id).await?;
            return Ok(LedgerApply {
                balance_after: balance,
                applied: false,
            });
        }
        self.apply_delta(
            app_id,
            account_id,
            -cost,
            LedgerSource::Spend,
            reference_id,
            note,
            idempotency_key,
            false,
        )
        .await
    }

    /// 钱包视图：余额 + 流水倒序分页
    pub async fn wallet(
        &self,
        app_id: i64,
        account_id: i64,
        query: &WalletQuery,
    ) -> AppResult<WalletResponse> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query = entries::Entity::find()
            .filter(entries::Column::AppId.eq(app_id))
            .filter(entries::Column::AccountId.eq(account_id));

        let total = base_query.clone().count(self.pool.as_ref()).await? as i64;

        let items_models = base_query
            .order_by(entries::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(self.pool.as_ref())
            .await?;

        let balance = items_models.first().map(|m| m.balance_after).unwrap_or(0);
        let balance = if params.get_offset() == 0 {
            balance
        } else {
            // 翻页时首行不是最新流水，单独取余额
            self.current_balance(app_id, account_id).await?
        };

        let items: Vec<LedgerEntryResponse> =
            items_models.into_iter().map(Into::into).collect();

        Ok(WalletResponse {
            balance,
            transactions: PaginatedResponse::new(
                items,
                params.page.unwrap_or(1),
                params.page_size.unwrap_or(20),
                total,
            ),
        })
    }

    async fn latest_balance<C: ConnectionTrait>(
        db: &C,
        app_id: i64,
        account_id: i64,
    ) -> Result<i64, DbErr> {
        let last = entries::Entity::find()
            .filter(entries::Column::AppId.eq(app_id))
            .filter(entries::Column::AccountId.eq(account_id))
            .order_by_desc(entries::Column::Id)
            .one(db)
            .await?;
        Ok(last.map(|m| m.balance_after).unwrap_or(0))
    }

    /// Upsert 余额缓存行
    async fn upsert_balance_cache(
        &self,
        app_id: i64,
        account_id: i64,
        balance: i64,
    ) -> Result<(), DbErr> {
        let insert = Query::insert()
            .into_table(balances::Entity)
            .columns([
                balances::Column::AppId,
                balances::Column::AccountId,
                balances::Column::Balance,
                balances::Column::UpdatedAt,
            ])
            .values_panic([
                app_id.into(),
                account_id.into(),
                balance.into(),
                Utc::now().into(),
            ])
            .on_conflict(
                OnConflict::columns([balances::Column::AppId, balances::Column::AccountId])
                    .update_columns([balances::Column::Balance, balances::Column::UpdatedAt])
                    .to_owned(),
            )
            .to_owned();
        let (sql, values) = insert.build(PostgresQueryBuilder);
        let stmt =
            sea_orm::Statement::from_sql_and_values(sea_orm::DatabaseBackend::Postgres, sql, values);
        self.pool.execute(stmt).await?;
        Ok(())
    }

    /// 从流水重放重建某账户的缓存行（运维修复用）
    pub async fn rebuild_balance_cache(&self, app_id: i64, account_id: i64) -> AppResult<i64> {
        let balance = Self::latest_balance(self.pool.as_ref(), app_id, account_id).await?;
        self.upsert_balance_cache(app_id, account_id, balance)
            .await?;
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn entry(id: i64, delta: i64, before: i64, key: Option<&str>) -> entries::Model {
        entries::Model {
            id,
            app_id: 1,
            account_id: 7,
            delta,
            balance_before: before,
            balance_after: before + delta,
            source: LedgerSource::Manual,
            reference_id: "test".to_string(),
            note: None,
            idempotency_key: key.map(|s| s.to_string()),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_apply_delta_appends_and_updates_cache() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // 幂等键查重：无
            .append_query_results([Vec::<entries::Model>::new()])
            // 最近一行：无流水，余额从 0 起
            .append_query_results([Vec::<entries::Model>::new()])
            // INSERT ... RETURNING
            .append_query_results([vec![entry(1, 50, 0, Some("k1"))]])
            // 缓存 upsert
            .append_exec_results([MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .into_connection();

        let svc = LedgerService::new(Arc::new(db));
        let applied = svc
            .apply_delta(1, 7, 50, LedgerSource::Manual, "test", None, Some("k1"), false)
            .await
            .unwrap();
        assert!(applied.applied);
        assert_eq!(applied.balance_after, 50);
    }

    #[tokio::test]
    async fn test_apply_delta_idempotent_key_reuse() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // 幂等键查重：命中
            .append_query_results([vec![entry(1, 50, 0, Some("k1"))]])
            // 当前余额：最近一行
            .append_query_results([vec![entry(2, -20, 50, None)]])
            .into_connection();

        let svc = LedgerService::new(Arc::new(db));
        let applied = svc
            .apply_delta(1, 7, 50, LedgerSource::Manual, "test", None, Some("k1"), false)
            .await
            .unwrap();
        assert!(!applied.applied);
        assert_eq!(applied.balance_after, 30);
    }

    #[tokio::test]
    async fn test_spend_if_enough_rejects_overdraft() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // 幂等键查重：无
            .append_query_results([Vec::<entries::Model>::new()])
            // 最近一行：余额 10
            .append_query_results([vec![entry(3, 10, 0, None)]])
            .into_connection();

        let svc = LedgerService::new(Arc::new(db));
        let err = svc
            .spend_if_enough(1, 7, 20, "test", None, Some("k2"))
            .await
            .unwrap_err();
        match err {
            AppError::InsufficientBalance { balance, cost } => {
                assert_eq!(balance, 10);
                assert_eq!(cost, 20);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_spend_if_enough_zero_cost_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // current_balance 读取最近一行
            .append_query_results([vec![entry(4, 30, 0, None)]])
            .into_connection();

        let svc = LedgerService::new(Arc::new(db));
        let applied = svc.spend_if_enough(1, 7, 0, "test", None, None).await.unwrap();
        assert!(!applied.applied);
        assert_eq!(applied.balance_after, 30);
    }
}
