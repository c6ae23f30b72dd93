use crate::core::{ConfigProvider, ListParams, RecordPage, RecordSource};
use crate::utils::error::{AirtableError, Result};
use crate::utils::secret::AccessToken;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Read-only client for the list-records endpoint of one Airtable base.
///
/// Certificate verification is always enabled; there is no switch to turn it off.
pub struct AirtableClient {
    client: Client,
    api_url: Url,
    base_id: String,
    token: AccessToken,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl AirtableClient {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout().min(Duration::from_secs(10)))
            .user_agent(concat!("airtable-debug/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: Url::parse(config.api_url())?,
            base_id: config.base_id().to_string(),
            token: config.access_token().clone(),
            retry_attempts: config.retry_attempts(),
            retry_delay: config.retry_delay(),
        })
    }

    /// `{api_url}/v0/{base_id}/{table}` with the table percent-encoded as a path segment.
    pub fn table_url(&self, table: &str) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| AirtableError::InvalidConfigValueError {
                field: "airtable.api_url".to_string(),
                value: self.api_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .push("v0")
            .push(&self.base_id)
            .push(table);
        Ok(url)
    }

    fn is_retryable(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Seconds form of `Retry-After`; HTTP dates are ignored.
    fn retry_after(headers: &HeaderMap) -> Option<Duration> {
        let seconds = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
        Some(Duration::from_secs(seconds).min(MAX_RETRY_AFTER))
    }

    /// The configured delay, stretched to `Retry-After` when the server asks for longer.
    fn backoff(&self, headers: &HeaderMap) -> Duration {
        Self::retry_after(headers).map_or(self.retry_delay, |wait| wait.max(self.retry_delay))
    }
}

#[async_trait::async_trait]
impl RecordSource for AirtableClient {
    async fn list_page(&self, table: &str, params: &ListParams) -> Result<RecordPage> {
        let url = self.table_url(table)?;
        let query = params.to_query_pairs();
        let mut attempt = 0;

        loop {
            tracing::debug!("GET {} (attempt {})", url, attempt + 1);
            let response = self
                .client
                .get(url.clone())
                .bearer_auth(self.token.expose())
                .query(&query)
                .send()
                .await?;

            let status = response.status();
            tracing::debug!("Airtable response status: {}", status);

            if status.is_success() {
                let page: RecordPage = response.json().await?;
                tracing::debug!(
                    "Received {} records (more pages: {})",
                    page.records.len(),
                    page.offset.is_some()
                );
                return Ok(page);
            }

            let delay = self.backoff(response.headers());
            let body = response.text().await.unwrap_or_default();
            if Self::is_retryable(status) && attempt < self.retry_attempts {
                attempt += 1;
                tracing::warn!(
                    "Airtable returned {} for table {}, retrying in {:?} ({}/{})",
                    status,
                    table,
                    delay,
                    attempt,
                    self.retry_attempts
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            return Err(AirtableError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
    }
}
