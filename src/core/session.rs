use crate::core::probe::run_suite;
use crate::core::records::{count_matching, fetch_api_key, inspect_fields};
use crate::core::{Command, RecordSource};
use crate::utils::error::Result;
use crate::utils::secret::mask_secret;
use std::collections::BTreeMap;

/// Executes commands against a record source and renders what the CLI prints.
pub struct DebugSession<S: RecordSource> {
    source: S,
    tables: BTreeMap<String, String>,
}

impl<S: RecordSource> DebugSession<S> {
    pub fn new(source: S, tables: BTreeMap<String, String>) -> Self {
        Self { source, tables }
    }

    /// Alias from the `[tables]` section, or the reference itself.
    pub fn resolve_table(&self, table: &str) -> String {
        self.tables
            .get(table)
            .cloned()
            .unwrap_or_else(|| table.to_string())
    }

    pub async fn run(&self, command: &Command) -> Result<String> {
        match command {
            Command::Count {
                table,
                formula,
                max_pages,
            } => {
                let table_id = self.resolve_table(table);
                tracing::info!("Querying table {} with formula: {}", table_id, formula);
                let outcome = count_matching(&self.source, &table_id, formula, *max_pages).await?;

                let mut out = format!("Success! Found {} records.", outcome.records);
                if outcome.pages > 1 {
                    out.push_str(&format!(" ({} pages)", outcome.pages));
                }
                if outcome.truncated {
                    out.push_str("\nMore matching records exist beyond the pages counted.");
                }
                Ok(out)
            }
            Command::Fields { table } => {
                let table_id = self.resolve_table(table);
                tracing::info!("Inspecting fields of table {}", table_id);
                Ok(match inspect_fields(&self.source, &table_id).await? {
                    Some(fields) => format!("Fields found: {:?}", fields),
                    None => format!("No records found in {}", table),
                })
            }
            Command::ApiKey {
                table,
                field,
                reveal,
            } => {
                let table_id = self.resolve_table(table);
                tracing::info!("Fetching API key from table {}", table_id);
                Ok(match fetch_api_key(&self.source, &table_id, field).await? {
                    Some(key) if *reveal => format!("FOUND KEY: {}", key),
                    Some(key) => format!("FOUND KEY: {}", mask_secret(&key)),
                    None => "No keys found in table.".to_string(),
                })
            }
            Command::Probe { probes } => {
                let report = run_suite(&self.source, probes, |t| self.resolve_table(t)).await;
                if report.failed() > 0 {
                    tracing::warn!(
                        "{} of {} probes failed",
                        report.failed(),
                        report.outcomes.len()
                    );
                }
                Ok(report.to_string())
            }
            Command::Tables => {
                if self.tables.is_empty() {
                    return Ok("No table aliases configured.".to_string());
                }
                Ok(self
                    .tables
                    .iter()
                    .map(|(alias, id)| format!("{:<16} {}", alias, id))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }
}
