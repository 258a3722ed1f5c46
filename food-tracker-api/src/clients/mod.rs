//! HTTP clients for the services this one composes with.

pub mod backend;
pub mod rda;

pub use backend::BackendClient;
pub use rda::RdaClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid base URL {0}")]
    InvalidBaseUrl(String),

    #[error("Credential is not a valid header value")]
    InvalidCredential,

    #[error("Failed to fetch {what}: status={status}, body={body}")]
    Status {
        what: &'static str,
        status: u16,
        body: String,
    },

    #[error("User with id {0} does not exist")]
    UserNotFound(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Parse a base URL that path segments can be appended to.
pub(crate) fn parse_base_url(base_url: &str) -> ClientResult<url::Url> {
    let url = url::Url::parse(base_url)
        .map_err(|e| ClientError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
    }
    Ok(url)
}

/// Append already-unescaped segments to `base`, percent-encoding each one.
pub(crate) fn join_segments(base: &url::Url, segments: &[&str]) -> ClientResult<url::Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
