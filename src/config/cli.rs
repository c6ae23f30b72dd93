use crate::config::{AirtableSettings, Overrides};
use crate::core::records::field_equals;
use crate::core::Command;
use crate::utils::error::{AirtableError, Result};
use crate::utils::secret::AccessToken;
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "airtable-debug")]
#[command(about = "Inspect the tables of an Airtable base from the command line")]
pub struct CliConfig {
    /// TOML file with [airtable], [tables] and [[probes]] sections
    #[arg(long, short, global = true, env = "AIRTABLE_DEBUG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Personal access token
    #[arg(long, global = true, env = "AIRTABLE_PAT", hide_env_values = true)]
    pub token: Option<AccessToken>,

    #[arg(long, global = true, env = "AIRTABLE_BASE_ID")]
    pub base_id: Option<String>,

    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Retries for rate-limited (429) and 5xx responses
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Count records matching a filterByFormula expression
    Count {
        /// Table alias, id or name
        table: String,

        #[arg(long, required_unless_present = "field", conflicts_with = "field")]
        formula: Option<String>,

        /// Build `{FIELD} = 'VALUE'` instead of passing --formula
        #[arg(long, requires = "equals")]
        field: Option<String>,

        #[arg(long, requires = "field")]
        equals: Option<String>,

        /// Count a single page (at most 100 records)
        #[arg(long, conflicts_with = "max_pages")]
        first_page_only: bool,

        /// Stop after this many pages (must be at least 1)
        #[arg(long)]
        max_pages: Option<NonZeroUsize>,
    },
    /// List the field names present on the first record of a table
    Fields { table: String },
    /// Read the API key stored on the first record of a table
    ApiKey {
        table: String,

        #[arg(long, default_value = "API Key")]
        field: String,

        /// Print the key unmasked
        #[arg(long)]
        reveal: bool,
    },
    /// Run the [[probes]] defined in the config file
    Probe {
        /// Run only the probes with these labels
        #[arg(long)]
        only: Vec<String>,
    },
    /// List configured table aliases
    Tables,
}

impl CliConfig {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            base_id: self.base_id.clone(),
            token: self.token.clone(),
            timeout_seconds: self.timeout_secs,
            retry_attempts: self.retries,
        }
    }

    pub fn to_command(&self, settings: &AirtableSettings) -> Result<Command> {
        let command = match &self.command {
            CliCommand::Count {
                table,
                formula,
                field,
                equals,
                first_page_only,
                max_pages,
            } => {
                let formula = match (formula, field, equals) {
                    (Some(formula), _, _) => formula.clone(),
                    (None, Some(field), Some(value)) => field_equals(field, value),
                    _ => {
                        return Err(AirtableError::ConfigValidationError {
                            field: "count".to_string(),
                            message: "pass --formula or --field with --equals".to_string(),
                        })
                    }
                };
                Command::Count {
                    table: table.clone(),
                    formula,
                    max_pages: if *first_page_only {
                        Some(NonZeroUsize::MIN)
                    } else {
                        *max_pages
                    },
                }
            }
            CliCommand::Fields { table } => Command::Fields {
                table: table.clone(),
            },
            CliCommand::ApiKey {
                table,
                field,
                reveal,
            } => Command::ApiKey {
                table: table.clone(),
                field: field.clone(),
                reveal: *reveal,
            },
            CliCommand::Probe { only } => {
                let probes: Vec<_> = settings
                    .probes
                    .iter()
                    .filter(|p| only.is_empty() || only.contains(&p.label))
                    .cloned()
                    .collect();
                if probes.is_empty() {
                    return Err(AirtableError::ConfigValidationError {
                        field: "probes".to_string(),
                        message: "no matching [[probes]] in the config file".to_string(),
                    });
                }
                Command::Probe { probes }
            }
            CliCommand::Tables => Command::Tables,
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProbeDefinition;
    use std::collections::BTreeMap;

    fn settings() -> AirtableSettings {
        AirtableSettings {
            api_url: "https://api.airtable.com".to_string(),
            base_id: "appTEST".to_string(),
            token: AccessToken::new("patTEST"),
            timeout_seconds: 30,
            retry_attempts: 0,
            retry_delay_ms: 0,
            tables: BTreeMap::new(),
            probes: vec![
                ProbeDefinition {
                    label: "Users Table (Email)".to_string(),
                    table: "users".to_string(),
                    formula: "{email} = 'test@example.com'".to_string(),
                },
                ProbeDefinition {
                    label: "Plans Table (Name)".to_string(),
                    table: "plans".to_string(),
                    formula: "{Name} = 'Free'".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_count_with_field_equals() {
        let cli = CliConfig::parse_from([
            "airtable-debug",
            "--token",
            "patX",
            "count",
            "users",
            "--field",
            "User Name",
            "--equals",
            "testuser",
            "--first-page-only",
        ]);

        assert_eq!(cli.overrides().token.unwrap().expose(), "patX");
        assert_eq!(
            cli.to_command(&settings()).unwrap(),
            Command::Count {
                table: "users".to_string(),
                formula: "{User Name} = 'testuser'".to_string(),
                max_pages: Some(NonZeroUsize::MIN),
            }
        );
    }

    #[test]
    fn test_max_pages_must_be_positive() {
        let zero = CliConfig::try_parse_from([
            "airtable-debug",
            "count",
            "users",
            "--formula",
            "TRUE()",
            "--max-pages",
            "0",
        ]);
        assert!(zero.is_err());

        let three = CliConfig::parse_from([
            "airtable-debug",
            "count",
            "users",
            "--formula",
            "TRUE()",
            "--max-pages",
            "3",
        ]);
        match three.to_command(&settings()).unwrap() {
            Command::Count { max_pages, .. } => {
                assert_eq!(max_pages.map(NonZeroUsize::get), Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_count_requires_a_filter() {
        assert!(CliConfig::try_parse_from(["airtable-debug", "count", "users"]).is_err());
        assert!(CliConfig::try_parse_from([
            "airtable-debug",
            "count",
            "users",
            "--formula",
            "TRUE()",
            "--field",
            "x",
            "--equals",
            "y"
        ])
        .is_err());
    }

    #[test]
    fn test_api_key_defaults() {
        let cli = CliConfig::parse_from(["airtable-debug", "api-key", "api_keys"]);
        assert_eq!(
            cli.to_command(&settings()).unwrap(),
            Command::ApiKey {
                table: "api_keys".to_string(),
                field: "API Key".to_string(),
                reveal: false,
            }
        );
    }

    #[test]
    fn test_probe_filter_by_label() {
        let cli = CliConfig::parse_from([
            "airtable-debug",
            "probe",
            "--only",
            "Plans Table (Name)",
        ]);
        match cli.to_command(&settings()).unwrap() {
            Command::Probe { probes } => {
                assert_eq!(probes.len(), 1);
                assert_eq!(probes[0].table, "plans");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let none = CliConfig::parse_from(["airtable-debug", "probe", "--only", "nope"]);
        assert!(none.to_command(&settings()).is_err());
    }

    #[test]
    fn test_token_is_redacted_in_debug_output() {
        let cli = CliConfig::parse_from(["airtable-debug", "--token", "patSECRET", "tables"]);
        assert!(!format!("{:?}", cli).contains("patSECRET"));
    }
}
