use food_tracker_core::{ActivityLevel, Gender, UserInfo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateUserInfoRequest {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(range(min = 1, max = 150))]
    pub age: u32,
    /// centimeters
    #[validate(range(exclusive_min = 0.0, max = 300.0))]
    pub height: f64,
    /// kilograms
    #[validate(range(exclusive_min = 0.0, max = 700.0))]
    pub weight: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl From<CreateUserInfoRequest> for UserInfo {
    fn from(request: CreateUserInfoRequest) -> Self {
        UserInfo::new(
            request.username.trim().to_string(),
            request.age,
            request.height,
            request.weight,
            request.gender,
            request.activity_level,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfoResponse {
    pub id: Uuid,
    pub username: String,
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl From<UserInfo> for UserInfoResponse {
    fn from(user: UserInfo) -> Self {
        Self {
            id: user.id.into(),
            username: user.username,
            age: user.age,
            height: user.height,
            weight: user.weight,
            gender: user.gender,
            activity_level: user.activity_level,
        }
    }
}

/// Answer to a create or delete, echoing the user
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfoChangedResponse {
    pub message: String,
    pub user_info: UserInfoResponse,
}
