pub mod account_balances;
pub mod accounts;
pub mod apps;
pub mod broadcast_jobs;
pub mod broadcasts;
pub mod ledger_entries;
pub mod prizes;
pub mod redeem_grants;
pub mod wheel_spins;

pub use account_balances as account_balance_entity;
pub use accounts as account_entity;
pub use apps as app_entity;
pub use broadcast_jobs as broadcast_job_entity;
pub use broadcasts as broadcast_entity;
pub use ledger_entries as ledger_entry_entity;
pub use prizes as prize_entity;
pub use redeem_grants as redeem_grant_entity;
pub use wheel_spins as wheel_spin_entity;

pub use broadcast_jobs::BroadcastJobStatus;
pub use broadcasts::{BroadcastSegment, BroadcastStatus};
pub use ledger_entries::LedgerSource;
pub use redeem_grants::{GrantKind, GrantStatus};
pub use wheel_spins::SpinStatus;
