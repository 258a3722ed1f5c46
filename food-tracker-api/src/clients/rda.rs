//! Client for the serverless daily RDA action.

use food_tracker_core::UserInfo;
use reqwest::{header, Client};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::{join_segments, parse_base_url, ClientError, ClientResult};

#[derive(Debug, Serialize)]
struct RdaRequest<'a> {
    age: u32,
    height: f64,
    weight: f64,
    gender: &'a str,
    activity_level: &'a str,
}

impl<'a> From<&'a UserInfo> for RdaRequest<'a> {
    fn from(user: &'a UserInfo) -> Self {
        Self {
            age: user.age,
            height: user.height,
            weight: user.weight,
            gender: user.gender.as_str(),
            activity_level: user.activity_level.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RdaClient {
    client: Client,
    base_url: url::Url,
}

impl RdaClient {
    /// `auth` is the pre-encoded basic credential of the serverless namespace.
    pub fn new(base_url: &str, auth: &str, timeout: Duration) -> ClientResult<Self> {
        let mut headers = header::HeaderMap::new();
        let credential = header::HeaderValue::try_from(format!("Basic {auth}"))
            .map_err(|_| ClientError::InvalidCredential)?;
        headers.insert(header::AUTHORIZATION, credential);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Recommended daily allowance for a user, returned as the action produced it.
    pub async fn daily_rda(&self, user: &UserInfo) -> ClientResult<serde_json::Value> {
        let url = join_segments(&self.base_url, &["actions", "get_daily_rda"])?;
        debug!(%url, user_id = %user.id, "Requesting daily RDA");

        let response = self
            .client
            .post(url)
            .query(&[("blocking", "true"), ("result", "true")])
            .json(&RdaRequest::from(user))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                what: "daily RDA",
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}
