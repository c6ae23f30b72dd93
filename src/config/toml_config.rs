use crate::core::ProbeDefinition;
use crate::utils::error::{AirtableError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub airtable: AirtableSection,
    #[serde(default)]
    pub tables: BTreeMap<String, String>,
    #[serde(default)]
    pub probes: Vec<ProbeDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirtableSection {
    pub api_url: Option<String>,
    pub base_id: Option<String>,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AirtableError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AirtableError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AIRTABLE_PAT})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            AirtableError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        for (alias, id) in &self.tables {
            validate_non_empty_string("tables", alias)?;
            validate_non_empty_string(&format!("tables.{}", alias), id)?;
        }

        for (i, probe) in self.probes.iter().enumerate() {
            validate_non_empty_string(&format!("probes[{}].label", i), &probe.label)?;
            validate_non_empty_string(&format!("probes[{}].table", i), &probe.table)?;
            validate_non_empty_string(&format!("probes[{}].formula", i), &probe.formula)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[airtable]
base_id = "appXUeeWN1uD9NdCW"
timeout_seconds = 15

[tables]
users = "tblGWh6XpdEZxw8AE"
plans = "tblq2T5OUyrDFCda9"

[[probes]]
label = "Users Table (Email)"
table = "users"
formula = "{email} = 'test@example.com'"

[[probes]]
label = "Plans Table (Name)"
table = "plans"
formula = "{Name} = 'Free'"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.airtable.base_id.as_deref(), Some("appXUeeWN1uD9NdCW"));
        assert_eq!(config.airtable.timeout_seconds, Some(15));
        assert_eq!(config.tables.get("plans").unwrap(), "tblq2T5OUyrDFCda9");
        assert_eq!(config.probes.len(), 2);
        assert_eq!(config.probes[1].label, "Plans Table (Name)");
        assert_eq!(config.probes[1].formula, "{Name} = 'Free'");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.airtable.base_id.is_none());
        assert!(config.probes.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("AIRTABLE_DEBUG_TEST_TOKEN", "patFROMENV");

        let toml_content = r#"
[airtable]
token = "${AIRTABLE_DEBUG_TEST_TOKEN}"
base_id = "${AIRTABLE_DEBUG_UNSET_BASE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.airtable.token.as_deref(), Some("patFROMENV"));
        assert_eq!(
            config.airtable.base_id.as_deref(),
            Some("${AIRTABLE_DEBUG_UNSET_BASE}")
        );

        std::env::remove_var("AIRTABLE_DEBUG_TEST_TOKEN");
    }

    #[test]
    fn test_probe_with_blank_formula_is_rejected() {
        let toml_content = r#"
[[probes]]
label = "broken"
table = "users"
formula = "  "
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("probes[0].formula"));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = TomlConfig::from_toml_str("[airtable\nbase_id = 1").unwrap_err();
        assert!(matches!(err, AirtableError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[tables]\napi_keys = \"tblsDGYv8pFpNegcf\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.tables.get("api_keys").unwrap(), "tblsDGYv8pFpNegcf");
    }
}
