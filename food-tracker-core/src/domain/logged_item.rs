use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{FoodItemId, LoggedItemId, UserId};

/// Date format accepted by the logged item endpoints
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// A quantity of a food item a user ate on a given day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggedItem {
    pub id: LoggedItemId,
    pub timestamp: DateTime<Utc>,
    /// grams
    pub quantity: f64,
    pub user_id: UserId,
    pub food_item_id: FoodItemId,
}

impl LoggedItem {
    /// Log `quantity` grams of a food for a user, stamped at noon of `date`.
    pub fn new(user_id: UserId, food_item_id: FoodItemId, quantity: f64, date: NaiveDate) -> Self {
        Self {
            id: LoggedItemId::new(),
            timestamp: timestamp_for_date(date),
            quantity,
            user_id,
            food_item_id,
        }
    }
}

/// Arbitrary but stable time of day used for items logged on a date.
pub fn timestamp_for_date(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
        .and_utc()
}

/// Inclusive timestamp bounds covering every instant of `from..=to`.
pub fn day_range(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = from.and_time(NaiveTime::MIN).and_utc();
    let end = to
        .and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
        .and_utc();
    (start, end)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
}
