use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// One Airtable record as returned by the list-records endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// Field names in the order the API sent them.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub offset: Option<String>,
}

/// Query parameters for a single list-records call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub filter_by_formula: Option<String>,
    pub max_records: Option<u32>,
    pub offset: Option<String>,
}

impl ListParams {
    pub fn with_formula(formula: impl Into<String>) -> Self {
        Self {
            filter_by_formula: Some(formula.into()),
            ..Self::default()
        }
    }

    pub fn first_record() -> Self {
        Self {
            max_records: Some(1),
            ..Self::default()
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(formula) = &self.filter_by_formula {
            pairs.push(("filterByFormula".to_string(), formula.clone()));
        }
        if let Some(max) = self.max_records {
            pairs.push(("maxRecords".to_string(), max.to_string()));
        }
        if let Some(offset) = &self.offset {
            pairs.push(("offset".to_string(), offset.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeDefinition {
    pub label: String,
    pub table: String,
    pub formula: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub status: Option<u16>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub probe: ProbeDefinition,
    /// Table id the probe's table reference resolved to.
    pub table_id: String,
    pub result: std::result::Result<usize, ProbeFailure>,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Testing {} ---", self.probe.label)?;
        writeln!(
            f,
            "Querying table {} with formula: {}",
            self.table_id, self.probe.formula
        )?;
        match &self.result {
            Ok(count) => write!(f, "Success! Found {} records.", count),
            Err(ProbeFailure {
                status: Some(status),
                message,
            }) => write!(f, "Error ({}): {}", status, message),
            Err(ProbeFailure {
                status: None,
                message,
            }) => write!(f, "Exception: {}", message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    pub outcomes: Vec<ProbeOutcome>,
}

impl ProbeReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f)?;
            }
            write!(f, "{}", outcome)?;
        }
        if !self.outcomes.is_empty() {
            writeln!(f)?;
            writeln!(f)?;
        }
        write!(
            f,
            "{} probes: {} succeeded, {} failed",
            self.outcomes.len(),
            self.succeeded(),
            self.failed()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountOutcome {
    pub records: usize,
    pub pages: usize,
    /// More pages remained when the page limit stopped the count.
    pub truncated: bool,
}

/// A single unit of work for a debugging session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Count {
        table: String,
        formula: String,
        max_pages: Option<NonZeroUsize>,
    },
    Fields {
        table: String,
    },
    ApiKey {
        table: String,
        field: String,
        reveal: bool,
    },
    Probe {
        probes: Vec<ProbeDefinition>,
    },
    Tables,
}
