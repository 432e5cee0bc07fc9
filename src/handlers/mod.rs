pub mod broadcast;
pub mod redeem;
pub mod wallet;
pub mod wheel;

pub use broadcast::broadcast_config;
pub use redeem::redeem_config;
pub use wallet::wallet_config;
pub use wheel::wheel_config;
