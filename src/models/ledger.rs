use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{LedgerSource, ledger_entry_entity as entries};

use super::PaginatedResponse;

/// applyDelta 的结果。applied=false 表示命中幂等键，本次未写入新流水。
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct LedgerApply {
    pub balance_after: i64,
    pub applied: bool,
}

/// 流水查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WalletQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerEntryResponse {
    pub id: i64,
    pub delta: i64,
    pub balance_after: i64,
    pub source: LedgerSource,
    pub reference_id: String,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<entries::Model> for LedgerEntryResponse {
    fn from(m: entries::Model) -> Self {
        LedgerEntryResponse {
            id: m.id,
            delta: m.delta,
            balance_after: m.balance_after,
            source: m.source,
            reference_id: m.reference_id,
            note: m.note,
            created_at: m.created_at,
        }
    }
}

/// 钱包视图：当前余额 + 流水（倒序分页）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WalletResponse {
    pub balance: i64,
    pub transactions: PaginatedResponse<LedgerEntryResponse>,
}

/// 运营手工调整请求。幂等键由调用方提供，重试安全。
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdjustRequest {
    pub delta: i64,
    pub note: Option<String>,
    pub idempotency_key: Option<String>,
}
