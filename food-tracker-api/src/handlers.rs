pub mod food_items;
pub mod health;
pub mod logged_items;
pub mod user_infos;

pub async fn root() -> &'static str {
    "Hello, this is the root endpoint of food_tracker"
}
