pub mod messenger;

pub use messenger::{MessageButton, MessengerService, is_blocked_error};
