pub mod broadcast_service;
pub mod ledger_service;
pub mod prize_catalog_service;
pub mod redeem_service;
pub mod wheel_service;

pub use broadcast_service::*;
pub use ledger_service::*;
pub use prize_catalog_service::*;
pub use redeem_service::*;
pub use wheel_service::*;
