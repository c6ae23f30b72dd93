#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::{ConfigProvider, ProbeDefinition};
use crate::utils::error::{AirtableError, Result};
use crate::utils::secret::AccessToken;
use crate::utils::validation::{
    validate_id_prefix, validate_non_empty_string, validate_range, validate_required_field,
    validate_resolved, validate_url, Validate,
};
use std::collections::BTreeMap;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_API_URL: &str = "https://api.airtable.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Values given on the command line or through the environment. They win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub base_id: Option<String>,
    pub token: Option<AccessToken>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
}

/// Fully resolved connection settings for one Airtable base.
#[derive(Debug, Clone)]
pub struct AirtableSettings {
    pub api_url: String,
    pub base_id: String,
    pub token: AccessToken,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub tables: BTreeMap<String, String>,
    pub probes: Vec<ProbeDefinition>,
}

impl AirtableSettings {
    /// Merges the optional file with overrides and validates the result.
    pub fn resolve(file: Option<TomlConfig>, overrides: Overrides) -> Result<Self> {
        let file = file.unwrap_or_default();
        file.validate()?;
        let section = file.airtable;

        let base_id = overrides.base_id.or(section.base_id);
        let token = overrides
            .token
            .or_else(|| section.token.map(AccessToken::new));

        let settings = Self {
            api_url: overrides
                .api_url
                .or(section.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            base_id: validate_required_field("airtable.base_id", &base_id)?.clone(),
            token: validate_required_field("airtable.token", &token)?.clone(),
            timeout_seconds: overrides
                .timeout_seconds
                .or(section.timeout_seconds)
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            retry_attempts: overrides
                .retry_attempts
                .or(section.retry_attempts)
                .unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            retry_delay_ms: section.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS),
            tables: file.tables,
            probes: file.probes,
        };

        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for AirtableSettings {
    fn validate(&self) -> Result<()> {
        validate_url("airtable.api_url", &self.api_url)?;
        validate_resolved("airtable.base_id", &self.base_id)?;
        validate_id_prefix("airtable.base_id", &self.base_id, "app")?;

        validate_resolved("airtable.token", self.token.expose())?;
        if self.token.expose().trim().is_empty() {
            return Err(AirtableError::MissingConfigError {
                field: "airtable.token".to_string(),
            });
        }

        validate_range("airtable.timeout_seconds", self.timeout_seconds, 1, 300)?;
        validate_range("airtable.retry_attempts", self.retry_attempts, 0, 10)?;
        validate_range("airtable.retry_delay_ms", self.retry_delay_ms, 0, 60_000)?;

        for (alias, id) in &self.tables {
            validate_non_empty_string(&format!("tables.{}", alias), id)?;
        }
        Ok(())
    }
}

impl ConfigProvider for AirtableSettings {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    fn base_id(&self) -> &str {
        &self.base_id
    }

    fn access_token(&self) -> &AccessToken {
        &self.token
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
