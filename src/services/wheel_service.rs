use crate::config::WheelConfig;
use crate::entities::{
    GrantKind, GrantStatus, LedgerSource, SpinStatus, app_entity as apps, prize_entity as prizes,
    redeem_grant_entity as grants, wheel_spin_entity as spins,
};
use crate::error::{AppError, AppResult};
use crate::external::MessengerService;
use crate::models::{ClaimResponse, SpinResponse};
use crate::services::{LedgerService, PrizeCatalogService};
use crate::utils::generate_redeem_code;
use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use std::sync::Arc;

/// 转盘抽奖状态机: new -> won -> issued -> redeemed (declined 分支见核销流程)。
/// 每个账户至多一个 won 实例，重复 draw 幂等返回已有实例。
#[derive(Clone)]
pub struct WheelService {
    pool: Arc<DatabaseConnection>,
    ledger: LedgerService,
    catalog: PrizeCatalogService,
    messenger: MessengerService,
    config: WheelConfig,
}

impl WheelService {
    pub fn new(
        pool: Arc<DatabaseConnection>,
        ledger: LedgerService,
        catalog: PrizeCatalogService,
        messenger: MessengerService,
        config: WheelConfig,
    ) -> Self {
        Self {
            pool,
            ledger,
            catalog,
            messenger,
            config,
        }
    }

    /// 抽一次转盘
    ///
    /// 1. 已有未领取（won）实例 -> 原样返回，不再扣费（策略，不是错误）
    /// 2. 创建 new 实例并记录本次费用
    /// 3. 按实例 id 派生幂等键扣费，余额不足则删实例报错
    /// 4. 在启用奖池上按权重随机选奖，空奖池退费（独立幂等键）后报错
    /// 5. 实例转 won，返回奖品与余额快照
    pub async fn draw(&self, app_id: i64, account_id: i64) -> AppResult<SpinResponse> {
        if let Some(open) = self.find_won_spin(app_id, account_id).await? {
            let balance = self.ledger.current_balance(app_id, account_id).await?;
            return Ok(SpinResponse::from_won_spin(&open, balance, true));
        }

        let app = apps::Entity::find_by_id(app_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("App not found".to_string()))?;
        let cost = app.spin_cost;

        let spin = spins::ActiveModel {
            app_id: Set(app_id),
            account_id: Set(account_id),
            status: Set(SpinStatus::New),
            cost: Set(cost),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        // 扣费。幂等键由实例 id 派生，重试的 draw 请求不会二次扣费
        let debit = match self
            .ledger
            .spend_if_enough(
                app_id,
                account_id,
                cost,
                &format!("wheel_spin:{}", spin.id),
                Some("Wheel spin cost"),
                Some(&format!("wheel:{}:cost", spin.id)),
            )
            .await
        {
            Ok(applied) => applied,
            Err(err @ AppError::InsufficientBalance { .. }) => {
                spin.delete(self.pool.as_ref()).await?;
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let pool = self.catalog.list_active(app_id).await?;
        if pool.is_empty() {
            // 扣了费但没有可选奖品：按独立幂等键退费。
            // 扣费与退费之间进程崩溃会让账户短少一次费用，已知缺口，
            // 见补偿事务的后续规划。
            if cost > 0 {
                self.ledger
                    .apply_delta(
                        app_id,
                        account_id,
                        cost,
                        LedgerSource::Refund,
                        &format!("wheel_spin:{}", spin.id),
                        Some("Refund: no prizes available"),
                        Some(&format!("wheel:{}:refund", spin.id)),
                        false,
                    )
                    .await?;
            }
            return Err(AppError::NoPrizesAvailable);
        }

        let total_weight: i64 = pool.iter().map(|p| p.weight as i64).sum();
        let roll = rand::thread_rng().gen_range(0..total_weight);
        let selected = pick_weighted(&pool, roll)
            .ok_or_else(|| AppError::InternalError("Prize selection failed".to_string()))?
            .clone();

        let mut am = spin.into_active_model();
        am.status = Set(SpinStatus::Won);
        am.prize_code = Set(Some(selected.code.clone()));
        am.prize_title = Set(Some(selected.title.clone()));
        am.won_at = Set(Some(Utc::now()));
        let spin = am.update(self.pool.as_ref()).await?;

        Ok(SpinResponse::from_won_spin(
            &spin,
            debit.balance_after,
            false,
        ))
    }

    /// 领取已中奖实例：生成兑换短码（冲突时有限重试），实例转 issued，
    /// 并尽力通过 bot 通知用户短码与 deep link（通知失败只记日志）。
    /// 已是 issued 的实例返回现有短码而不是再发一个。
    pub async fn claim(&self, app_id: i64, account_id: i64) -> AppResult<ClaimResponse> {
        let app = apps::Entity::find_by_id(app_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("App not found".to_string()))?;

        let Some(spin) = self.find_won_spin(app_id, account_id).await? else {
            // 没有待领取实例；若最近一次已领过，幂等返回现有短码
            if let Some(existing) = self.find_issued_grant(app_id, account_id).await? {
                return Ok(self.claim_response(&app, existing));
            }
            return Err(AppError::NothingToClaim);
        };

        let prize_code = spin
            .prize_code
            .clone()
            .ok_or_else(|| AppError::InternalError("Won spin without prize".to_string()))?;

        let grant = self
            .insert_grant_with_retry(app_id, account_id, spin.id, &prize_code)
            .await?;

        // won -> issued 条件更新；0 行说明并发领取已先行。
        // 此时必须作废本次生成的短码并改用先行者的，
        // 否则同一实例会有两个活跃短码，核销两次就派发两次。
        let updated = spins::Entity::update_many()
            .col_expr(
                spins::Column::Status,
                sea_orm::sea_query::Expr::value(SpinStatus::Issued),
            )
            .col_expr(
                spins::Column::IssuedAt,
                sea_orm::sea_query::Expr::value(Utc::now()),
            )
            .filter(spins::Column::Id.eq(spin.id))
            .filter(spins::Column::Status.eq(SpinStatus::Won))
            .exec(self.pool.as_ref())
            .await?;
        if updated.rows_affected == 0 {
            log::info!(
                "Spin {} already issued by a concurrent claim, discarding duplicate code",
                spin.id
            );
            grants::Entity::delete_by_id(grant.id)
                .exec(self.pool.as_ref())
                .await?;
            let existing = grants::Entity::find()
                .filter(grants::Column::SpinId.eq(spin.id))
                .filter(grants::Column::Status.eq(GrantStatus::Issued))
                .order_by_desc(grants::Column::Id)
                .one(self.pool.as_ref())
                .await?
                .ok_or(AppError::NothingToClaim)?;
            return Ok(self.claim_response(&app, existing));
        }

        let response = self.claim_response(&app, grant);

        // 事务核心之外的通知，失败不回滚
        if let Some(token) = app.bot_token.as_deref() {
            let mut text = format!(
                "Your prize \"{}\" is ready! Show code {} at the counter.",
                spin.prize_title.as_deref().unwrap_or("prize"),
                response.redeem_code
            );
            if let Some(link) = &response.deep_link {
                text.push_str(&format!("\n{link}"));
            }
            if let Err(e) = self
                .messenger
                .send_message(token, account_id, &text, None)
                .await
            {
                log::warn!("Claim notification failed for account {account_id}: {e:?}");
            }
        }

        Ok(response)
    }

    async fn find_won_spin(
        &self,
        app_id: i64,
        account_id: i64,
    ) -> AppResult<Option<spins::Model>> {
        let found = spins::Entity::find()
            .filter(spins::Column::AppId.eq(app_id))
            .filter(spins::Column::AccountId.eq(account_id))
            .filter(spins::Column::Status.eq(SpinStatus::Won))
            .order_by_desc(spins::Column::Id)
            .one(self.pool.as_ref())
            .await?;
        Ok(found)
    }

    /// 最近一个仍在 issued 状态的兑换码（幂等重复领取用）
    async fn find_issued_grant(
        &self,
        app_id: i64,
        account_id: i64,
    ) -> AppResult<Option<grants::Model>> {
        let found = grants::Entity::find()
            .filter(grants::Column::AppId.eq(app_id))
            .filter(grants::Column::AccountId.eq(account_id))
            .filter(grants::Column::Kind.eq(GrantKind::Wheel))
            .filter(grants::Column::Status.eq(GrantStatus::Issued))
            .order_by_desc(grants::Column::Id)
            .one(self.pool.as_ref())
            .await?;
        Ok(found)
    }

    /// 插入兑换码，短码唯一冲突时重新生成，重试有上限
    async fn insert_grant_with_retry(
        &self,
        app_id: i64,
        account_id: i64,
        spin_id: i64,
        prize_code: &str,
    ) -> AppResult<grants::Model> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let code = generate_redeem_code(self.config.code_length);
            let result = grants::ActiveModel {
                app_id: Set(app_id),
                account_id: Set(account_id),
                spin_id: Set(spin_id),
                code: Set(code),
                prize_code: Set(prize_code.to_string()),
                status: Set(GrantStatus::Issued),
                kind: Set(GrantKind::Wheel),
                ..Default::default()
            }
            .insert(self.pool.as_ref())
            .await;

            match result {
                Ok(grant) => return Ok(grant),
                Err(err) => {
                    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
                        && attempts < self.config.code_attempts
                    {
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }
    }

    fn claim_response(&self, app: &apps::Model, grant: grants::Model) -> ClaimResponse {
        let deep_link = app
            .bot_username
            .as_deref()
            .map(|u| format!("https://t.me/{u}?start=redeem_{}", grant.code));
        ClaimResponse {
            instance_id: grant.spin_id,
            redeem_code: grant.code,
            deep_link,
        }
    }
}

/// 权重随机选奖：roll 取自 [0, total_weight)，按固定顺序累加权重，
/// 返回首个累计权重超过 roll 的奖品。每项被选中概率与权重成正比，
/// 累计值相同处按目录顺序裁决。
pub fn pick_weighted(pool: &[prizes::Model], roll: i64) -> Option<&prizes::Model> {
    let mut acc: i64 = 0;
    for p in pool {
        acc += p.weight as i64;
        if roll < acc {
            return Some(p);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MessengerConfig;
    use crate::entities::ledger_entry_entity as entries;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn prize(id: i64, code: &str, weight: i32) -> prizes::Model {
        prizes::Model {
            id,
            app_id: 1,
            code: code.to_string(),
            title: code.to_uppercase(),
            weight,
            payout_amount: 0,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_pick_weighted_boundaries() {
        let pool = vec![prize(1, "a", 10), prize(2, "b", 20), prize(3, "c", 70)];
        assert_eq!(pick_weighted(&pool, 0).unwrap().code, "a");
        assert_eq!(pick_weighted(&pool, 9).unwrap().code, "a");
        assert_eq!(pick_weighted(&pool, 10).unwrap().code, "b");
        assert_eq!(pick_weighted(&pool, 29).unwrap().code, "b");
        assert_eq!(pick_weighted(&pool, 30).unwrap().code, "c");
        assert_eq!(pick_weighted(&pool, 99).unwrap().code, "c");
        // roll 超出总权重时无法选中
        assert!(pick_weighted(&pool, 100).is_none());
    }

    #[test]
    fn test_pick_weighted_single_entry() {
        let pool = vec![prize(1, "only", 1)];
        assert_eq!(pick_weighted(&pool, 0).unwrap().code, "only");
    }

    #[test]
    fn test_pick_weighted_distribution() {
        // 权重 [10, 20, 70]，10 万次抽样后频率应接近 10%/20%/70%
        let pool = vec![prize(1, "a", 10), prize(2, "b", 20), prize(3, "c", 70)];
        let total: i64 = pool.iter().map(|p| p.weight as i64).sum();

        let mut counts = [0u32; 3];
        let mut rng = rand::thread_rng();
        let n = 100_000;
        for _ in 0..n {
            let roll = rng.gen_range(0..total);
            let picked = pick_weighted(&pool, roll).unwrap();
            counts[(picked.id - 1) as usize] += 1;
        }

        let freq = |i: usize| counts[i] as f64 / n as f64;
        assert!((freq(0) - 0.10).abs() < 0.01, "a: {}", freq(0));
        assert!((freq(1) - 0.20).abs() < 0.01, "b: {}", freq(1));
        assert!((freq(2) - 0.70).abs() < 0.01, "c: {}", freq(2));
    }

    fn service(db: DatabaseConnection) -> WheelService {
        let pool = Arc::new(db);
        WheelService::new(
            pool.clone(),
            LedgerService::new(pool.clone()),
            PrizeCatalogService::new(pool.clone()),
            MessengerService::new(MessengerConfig::default()),
            WheelConfig::default(),
        )
    }

    fn app_without_bot() -> apps::Model {
        apps::Model {
            id: 1,
            name: "test".to_string(),
            bot_token: None,
            bot_username: None,
            spin_cost: 20,
            created_at: None,
        }
    }

    fn won_spin(id: i64) -> spins::Model {
        spins::Model {
            id,
            app_id: 1,
            account_id: 7,
            status: SpinStatus::Won,
            prize_code: Some("coffee".to_string()),
            prize_title: Some("Coffee".to_string()),
            cost: 20,
            created_at: None,
            won_at: None,
            issued_at: None,
            redeemed_at: None,
            declined_at: None,
        }
    }

    fn grant(id: i64, spin_id: i64, code: &str) -> grants::Model {
        grants::Model {
            id,
            app_id: 1,
            account_id: 7,
            spin_id,
            code: code.to_string(),
            prize_code: "coffee".to_string(),
            status: GrantStatus::Issued,
            actor_id: None,
            kind: GrantKind::Wheel,
            created_at: None,
            redeemed_at: None,
            declined_at: None,
        }
    }

    #[tokio::test]
    async fn test_draw_with_open_win_returns_it_without_debit() {
        // 已有 won 实例时 draw 原样返回，不能再走扣费；
        // mock 没有为扣费准备任何结果，若多发查询会直接失败
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![won_spin(5)]])
            .append_query_results([vec![entries::Model {
                id: 1,
                app_id: 1,
                account_id: 7,
                delta: 30,
                balance_before: 0,
                balance_after: 30,
                source: LedgerSource::Manual,
                reference_id: "test".to_string(),
                note: None,
                idempotency_key: None,
                created_at: None,
            }]])
            .into_connection();

        let result = service(db).draw(1, 7).await.unwrap();
        assert!(result.already_won);
        assert_eq!(result.instance_id, 5);
        assert_eq!(result.prize.code, "coffee");
        assert_eq!(result.balance, 30);
    }

    #[tokio::test]
    async fn test_claim_race_loser_defers_to_winner_code() {
        // won -> issued 条件更新 0 行：并发领取已先行。
        // 败者必须删掉自己刚生成的短码并返回胜者的，
        // 否则同一实例存在两个可核销短码
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // app 查询
            .append_query_results([vec![app_without_bot()]])
            // won 实例
            .append_query_results([vec![won_spin(5)]])
            // 本次插入的短码 (INSERT ... RETURNING)
            .append_query_results([vec![grant(11, 5, "DUPXYZ")]])
            // 删除重复短码后反查该实例既有的 issued 短码
            .append_query_results([vec![grant(10, 5, "FIRST9")]])
            // 条件更新 won -> issued：0 行
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            // 删除本次生成的短码
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let result = service(db).claim(1, 7).await.unwrap();
        assert_eq!(result.redeem_code, "FIRST9");
        assert_eq!(result.instance_id, 5);
    }
}
