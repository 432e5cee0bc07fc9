use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{prize_entity, wheel_spin_entity as spins};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SpinRequest {
    pub account_id: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WonPrize {
    pub code: String,
    pub title: String,
}

/// 抽奖结果。already_won=true 表示返回的是已有的未领取实例，本次未扣费。
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpinResponse {
    pub instance_id: i64,
    pub prize: WonPrize,
    pub cost: i64,
    pub already_won: bool,
    /// 本次操作后的账户余额快照
    pub balance: i64,
}

impl SpinResponse {
    /// 从已中奖实例构造（draw 的幂等短路与正常路径共用）
    pub fn from_won_spin(spin: &spins::Model, balance: i64, already_won: bool) -> Self {
        SpinResponse {
            instance_id: spin.id,
            prize: WonPrize {
                code: spin.prize_code.clone().unwrap_or_default(),
                title: spin.prize_title.clone().unwrap_or_default(),
            },
            cost: spin.cost,
            already_won,
            balance,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClaimRequest {
    pub account_id: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClaimResponse {
    pub instance_id: i64,
    /// 报给核销员的短码
    pub redeem_code: String,
    /// 打开核销会话的 deep link，bot 未配置用户名时为空
    pub deep_link: Option<String>,
}

/// 奖品目录视图（仅展示参与抽取所需的字段）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeResponse {
    pub code: String,
    pub title: String,
    pub weight: i32,
    pub payout_amount: i64,
}

impl From<prize_entity::Model> for PrizeResponse {
    fn from(m: prize_entity::Model) -> Self {
        PrizeResponse {
            code: m.code,
            title: m.title,
            weight: m.weight,
            payout_amount: m.payout_amount,
        }
    }
}
