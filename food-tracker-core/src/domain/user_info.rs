use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

use super::ids::UserId;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
        }
    }
}

impl FromStr for Gender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(Gender::Male),
            "f" => Ok(Gender::Female),
            other => Err(CoreError::Validation(format!(
                "Invalid gender: {other}, allowed values: m, f"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::High => "high",
            ActivityLevel::VeryHigh => "very_high",
            ActivityLevel::Extreme => "extreme",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "high" => Ok(ActivityLevel::High),
            "very_high" => Ok(ActivityLevel::VeryHigh),
            "extreme" => Ok(ActivityLevel::Extreme),
            other => Err(CoreError::Validation(format!(
                "Invalid activity level: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct UserInfo {
    pub id: UserId,
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    pub age: u32,
    /// centimeters
    pub height: f64,
    /// kilograms
    pub weight: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl UserInfo {
    pub fn new(
        username: String,
        age: u32,
        height: f64,
        weight: f64,
        gender: Gender,
        activity_level: ActivityLevel,
    ) -> Self {
        Self {
            id: UserId::new(),
            username,
            age,
            height,
            weight,
            gender,
            activity_level,
        }
    }
}
