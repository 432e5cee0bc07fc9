pub mod broadcast;
pub mod ledger;
pub mod pagination;
pub mod redeem;
pub mod wheel;

pub use broadcast::*;
pub use ledger::*;
pub use pagination::*;
pub use redeem::*;
pub use wheel::*;
