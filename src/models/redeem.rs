use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ConfirmRequest {
    /// 核销员输入或点按的短码
    pub code: String,
    /// 核销员标识
    pub actor_id: i64,
}

/// 确认结果。already_processed=true 为幂等命中：别处已确认过，
/// 本次未派发积分，对终端用户不是错误。
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConfirmResponse {
    pub paid_amount: i64,
    pub already_processed: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeclineRequest {
    pub code: String,
    pub actor_id: i64,
}
