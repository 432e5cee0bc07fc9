use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::BroadcastSegment;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendBroadcastRequest {
    pub text: String,
    pub segment: BroadcastSegment,
    /// 可选按钮，text 与 url 需同时提供
    pub button_text: Option<String>,
    pub button_url: Option<String>,
}

/// 群发收尾报告。部分失败不是致命结果，计数器如实反映。
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct BroadcastReport {
    pub broadcast_id: i64,
    pub total: i64,
    pub sent: i64,
    pub failed: i64,
    pub blocked: i64,
}
