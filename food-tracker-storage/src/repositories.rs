pub mod circuit_breaker;
pub mod food_item;
pub mod logged_item;
pub mod user_info;

pub use circuit_breaker::*;
pub use food_item::*;
pub use logged_item::*;
pub use user_info::*;
