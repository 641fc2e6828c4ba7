//! e-Boekhouden REST API client.
//!
//! Authentication is a two-step flow: the configured API token buys a
//! short-lived session token (`POST /v1/session`), which then goes into
//! the `Authorization` header of every data request. Mutation listing is
//! offset-paginated; each page is retried with bounded backoff on
//! transient failures.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use boekstroom_core::mutation::RawMutation;
use boekstroom_shared::config::SourceConfig;

use super::error::ClientError;
use super::retry::{with_retry, RetryPolicy};

/// Defensive cap on pagination, matching the source system's observed
/// maximum history size.
const MAX_OFFSET: u32 = 50_000;

/// Abstraction over the external mutation source, so the orchestrator is
/// testable without HTTP.
#[async_trait]
pub trait MutationSource: Send + Sync {
    /// Fetches all mutations in the inclusive date range.
    async fn fetch_mutations(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<RawMutation>, ClientError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest<'a> {
    access_token: &'a str,
    source: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct MutationPage {
    #[serde(default)]
    items: Vec<RawMutation>,
}

/// REST client for the e-Boekhouden API.
pub struct EBoekhoudenClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    page_size: u32,
    retry: RetryPolicy,
}

impl EBoekhoudenClient {
    /// Creates a client from the source configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(config: &SourceConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            page_size: config.page_size,
            retry: RetryPolicy::default(),
        })
    }

    /// Overrides the retry policy (tests, probes).
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Opens a session and returns its token.
    async fn session_token(&self) -> Result<String, ClientError> {
        let url = format!("{}/v1/session", self.base_url);
        let request = SessionRequest {
            access_token: &self.api_token,
            source: "boekstroom",
        };
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(classify_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Auth(format!(
                "session request failed with status {status}"
            )));
        }
        let session: SessionResponse = response
            .json()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        Ok(session.token)
    }

    /// Fetches one page of mutations.
    async fn fetch_page(
        &self,
        token: &str,
        offset: u32,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<RawMutation>, ClientError> {
        let url = format!("{}/v1/mutation", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("limit", self.page_size.to_string()),
            ("offset", offset.to_string()),
        ];
        if let Some(from) = date_from {
            query.push(("dateFrom", from.to_string()));
        }
        if let Some(to) = date_to {
            query.push(("dateTo", to.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, token)
            .query(&query)
            .send()
            .await
            .map_err(classify_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(
                status.as_u16(),
                response.text().await.unwrap_or_default(),
            ));
        }
        let page: MutationPage = response
            .json()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        Ok(page.items)
    }
}

#[async_trait]
impl MutationSource for EBoekhoudenClient {
    async fn fetch_mutations(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<RawMutation>, ClientError> {
        let token = with_retry(&self.retry, ClientError::is_transient, || {
            self.session_token()
        })
        .await?;

        let mut all = Vec::new();
        let mut offset = 0u32;
        loop {
            let items = with_retry(&self.retry, ClientError::is_transient, || {
                self.fetch_page(&token, offset, date_from, date_to)
            })
            .await?;
            let page_len = items.len();
            all.extend(items);

            if page_len < self.page_size as usize {
                break;
            }
            offset += self.page_size;
            if offset > MAX_OFFSET {
                tracing::error!(offset, "pagination safety limit reached");
                break;
            }
        }
        tracing::info!(count = all.len(), "fetched mutations from source API");
        Ok(all)
    }
}

/// Maps a reqwest transport error onto the client taxonomy.
fn classify_reqwest(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout(err.to_string())
    } else {
        ClientError::Transport(err.to_string())
    }
}

/// Maps a non-success HTTP status onto the client taxonomy.
fn classify_status(status: u16, message: String) -> ClientError {
    if status >= 500 || status == 429 {
        ClientError::Server { status, message }
    } else {
        ClientError::Rejected { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(classify_status(500, String::new()).is_transient());
        assert!(classify_status(503, String::new()).is_transient());
        assert!(classify_status(429, String::new()).is_transient());
        assert!(!classify_status(400, String::new()).is_transient());
        assert!(!classify_status(404, String::new()).is_transient());
    }

    #[test]
    fn test_page_payload_decodes() {
        let json = r#"{"items": [
            {"id": 7296, "type": 1, "date": "2024-03-07",
             "rows": [{"ledgerId": 31760397, "amount": 113.08}]}
        ], "count": 1}"#;
        let page: MutationPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, 7296);
    }

    #[test]
    fn test_empty_page_payload_decodes() {
        let page: MutationPage = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_session_request_shape() {
        let request = SessionRequest {
            access_token: "tok",
            source: "boekstroom",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["accessToken"], "tok");
        assert_eq!(json["source"], "boekstroom");
    }
}
