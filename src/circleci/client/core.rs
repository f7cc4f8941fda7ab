use std::sync::Arc;
use std::time::Duration;

use log::warn;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use url::Url;

use crate::auth::Token;
use crate::error::{CiviewError, Result};

const MAX_RETRIES: u32 = 5;
const RETRY_DELAY_SECONDS: u64 = 2;
const MAX_CONCURRENT_REQUESTS: usize = 32;

/// Header carrying the API token.
const TOKEN_HEADER: &str = "Circle-Token";

/// HTTP client for the provider's REST v2 API.
///
/// Owns the auth header, a request-concurrency cap and the retry policy;
/// the typed endpoint wrappers live in the sibling modules.
pub struct CircleClient {
    client: reqwest::Client,
    api_base: Url,
    semaphore: Arc<Semaphore>,
}

impl CircleClient {
    pub fn new(base_url: &str, token: Option<&Token>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(token.as_str())
                .map_err(|e| CiviewError::Config(format!("Invalid API token: {e}")))?;
            headers.insert(TOKEN_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("ciview/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| CiviewError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base = Url::parse(base_url)
            .map_err(|e| CiviewError::Config(format!("Invalid base URL: {e}")))?;
        let api_base = base
            .join("api/v2/")
            .map_err(|e| CiviewError::Config(format!("Invalid API URL: {e}")))?;

        Ok(Self {
            client,
            api_base,
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS)),
        })
    }

    /// Execute a GET request with automatic retry on network errors, rate
    /// limits and server errors, and deserialize the JSON response.
    pub(super) async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        // One permit per logical request keeps fan-outs inside the
        // provider's rate limits.
        let _permit = self.semaphore.acquire().await.expect("semaphore never closed");

        let url = self
            .api_base
            .join(path)
            .map_err(|e| CiviewError::Config(format!("Invalid request path {path}: {e}")))?;

        let mut retry_count = 0;
        loop {
            let request = self.client.get(url.clone()).query(query);

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                    if retry_count >= MAX_RETRIES {
                        return Err(e.into());
                    }
                    warn!(
                        "Network error ({}), retrying in {}s ({}/{})...",
                        e,
                        RETRY_DELAY_SECONDS,
                        retry_count + 1,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECONDS)).await;
                    retry_count += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();

            if status == 429 || status.is_server_error() {
                if retry_count >= MAX_RETRIES {
                    return Err(CiviewError::ApiAfterRetries {
                        status: status.as_u16(),
                        retries: MAX_RETRIES,
                    });
                }

                warn!(
                    "API error (status {status}). Waiting {RETRY_DELAY_SECONDS}s before retry {}/{}...",
                    retry_count + 1,
                    MAX_RETRIES
                );

                tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECONDS)).await;
                retry_count += 1;
                continue;
            }

            if !status.is_success() {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read error response".to_string());
                return Err(CiviewError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.json().await?);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_an_unparseable_base_url() {
        let result = CircleClient::new("not a url", None);
        assert!(matches!(result, Err(CiviewError::Config(_))));
    }

    #[test]
    fn accepts_a_plain_https_base() {
        assert!(CircleClient::new("https://circleci.com", None).is_ok());
    }
}
