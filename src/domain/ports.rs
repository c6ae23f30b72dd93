use crate::domain::model::{ListParams, RecordPage};
use crate::utils::error::Result;
use crate::utils::secret::AccessToken;
use async_trait::async_trait;
use std::time::Duration;

/// Anything that can answer a list-records call for a table of one base.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn list_page(&self, table: &str, params: &ListParams) -> Result<RecordPage>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_url(&self) -> &str;
    fn base_id(&self) -> &str;
    fn access_token(&self) -> &AccessToken;
    fn timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
}
