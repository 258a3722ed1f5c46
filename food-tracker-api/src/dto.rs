pub mod food_item;
pub mod logged_item;
pub mod user_info;

pub use food_item::*;
pub use logged_item::*;
pub use user_info::*;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
